use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Claims carried by a locally issued session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,

    #[error("session token is malformed: {0}")]
    Malformed(String),

    #[error("session token could not be signed: {0}")]
    Signing(String),
}

/// Mints and verifies stateless HS256 session tokens bound to a user id.
///
/// The secret is read-only after startup and shared by every request.
#[derive(Clone)]
pub struct SessionIssuer {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
            ttl: Duration::hours(expiry_hours as i64),
        }
    }

    /// Issue a token for `user_id` expiring `ttl` from now
    pub fn issue(&self, user_id: i64) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::Signing("empty secret".to_string()));
        }
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Check signature and expiry. Expiry is enforced without leeway.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let issuer = SessionIssuer::new("test-secret", 24);
        let token = issuer.issue(42).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_token_with_valid_signature_is_rejected() {
        let issuer = SessionIssuer::new("test-secret", 24);
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&SessionClaims {
                user_id: 1,
                iat: now - 7200,
                exp: now - 5,
            })
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_malformed() {
        let issuer = SessionIssuer::new("test-secret", 24);
        let other = SessionIssuer::new("other-secret", 24);
        let token = other.issue(1).unwrap();
        assert!(matches!(issuer.verify(&token), Err(SessionError::Malformed(_))));
        assert!(matches!(issuer.verify("not-a-jwt"), Err(SessionError::Malformed(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let issuer = SessionIssuer::new("", 24);
        assert!(matches!(issuer.issue(1), Err(SessionError::Signing(_))));
    }
}

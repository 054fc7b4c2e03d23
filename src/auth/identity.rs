use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Identity asserted by the external provider after a token is verified
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalClaim {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("no client id is configured for the identity provider")]
    Unconfigured,

    #[error("identity token rejected: {0}")]
    Invalid(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Verification oracle for third-party identity tokens
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` for the given audience (the configured client id)
    async fn verify(&self, token: &str, audience: &str) -> Result<ExternalClaim, VerificationError>;
}

const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];

/// Google ID-token verification through the `tokeninfo` endpoint
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
}

/// Subset of the `tokeninfo` response we rely on. Google encodes `exp` as a string.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    exp: Option<String>,
}

impl GoogleTokenVerifier {
    pub fn new(tokeninfo_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            tokeninfo_url: tokeninfo_url.into(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, token: &str, audience: &str) -> Result<ExternalClaim, VerificationError> {
        if audience.trim().is_empty() {
            return Err(VerificationError::Unconfigured);
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| VerificationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(VerificationError::Unavailable(format!("tokeninfo returned {}", status)));
        }
        if !status.is_success() {
            return Err(VerificationError::Invalid(format!("tokeninfo returned {}", status)));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| VerificationError::Invalid(format!("unreadable tokeninfo response: {}", e)))?;

        claim_from_token_info(info, audience, Utc::now().timestamp())
    }
}

fn claim_from_token_info(info: TokenInfo, audience: &str, now: i64) -> Result<ExternalClaim, VerificationError> {
    if info.aud.as_deref() != Some(audience) {
        return Err(VerificationError::Invalid("audience mismatch".to_string()));
    }

    match info.iss.as_deref() {
        Some(iss) if GOOGLE_ISSUERS.contains(&iss) => {}
        other => return Err(VerificationError::Invalid(format!("unexpected issuer {:?}", other))),
    }

    let exp = info
        .exp
        .as_deref()
        .and_then(|exp| exp.parse::<i64>().ok())
        .ok_or_else(|| VerificationError::Invalid("missing expiry".to_string()))?;
    if exp <= now {
        return Err(VerificationError::Invalid("token expired".to_string()));
    }

    let subject = info
        .sub
        .filter(|s| !s.is_empty())
        .ok_or_else(|| VerificationError::Invalid("missing subject".to_string()))?;
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| VerificationError::Invalid("missing email".to_string()))?;

    Ok(ExternalClaim {
        subject,
        email,
        name: info.name.filter(|n| !n.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, iss: &str, exp: i64) -> TokenInfo {
        TokenInfo {
            aud: Some(aud.to_string()),
            iss: Some(iss.to_string()),
            sub: Some("1234567890".to_string()),
            email: Some("teacher@example.com".to_string()),
            name: Some("Teacher".to_string()),
            exp: Some(exp.to_string()),
        }
    }

    #[test]
    fn accepts_matching_audience_and_issuer() {
        let claim = claim_from_token_info(info("client-1", "https://accounts.google.com", 2_000), "client-1", 1_000).unwrap();
        assert_eq!(claim.subject, "1234567890");
        assert_eq!(claim.email, "teacher@example.com");
        assert_eq!(claim.name.as_deref(), Some("Teacher"));
    }

    #[test]
    fn rejects_audience_mismatch() {
        let err = claim_from_token_info(info("client-2", "accounts.google.com", 2_000), "client-1", 1_000).unwrap_err();
        assert!(matches!(err, VerificationError::Invalid(_)));
    }

    #[test]
    fn rejects_foreign_issuer_and_expired_tokens() {
        let err = claim_from_token_info(info("client-1", "https://evil.example", 2_000), "client-1", 1_000).unwrap_err();
        assert!(matches!(err, VerificationError::Invalid(_)));

        let err = claim_from_token_info(info("client-1", "accounts.google.com", 999), "client-1", 1_000).unwrap_err();
        assert!(matches!(err, VerificationError::Invalid(_)));
    }

    #[test]
    fn rejects_missing_email() {
        let mut token = info("client-1", "accounts.google.com", 2_000);
        token.email = None;
        assert!(claim_from_token_info(token, "client-1", 1_000).is_err());
    }

    #[tokio::test]
    async fn blank_audience_is_unconfigured() {
        let verifier = GoogleTokenVerifier::new("http://127.0.0.1:9/tokeninfo", Duration::from_secs(1)).unwrap();
        assert!(matches!(verifier.verify("token", " ").await, Err(VerificationError::Unconfigured)));
    }
}

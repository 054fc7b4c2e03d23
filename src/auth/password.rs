use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

pub fn meets_minimum_length(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Hash a password into a salted Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Compare a candidate password with a stored hash. Unparseable hashes never match.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// [`hash_password`] on the blocking thread pool, off the async workers
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool, off the async workers
pub async fn verify_password_blocking(stored_hash: String, password: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .map_err(|e| PasswordError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();
        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
        assert!(!first.contains("password"));
        assert!(verify_password(&first, "password"));
        assert!(!verify_password(&first, "Password"));
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert!(!verify_password("pbkdf2:sha256:260000$abc$def", "password"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn length_counts_characters() {
        assert!(!meets_minimum_length("12345"));
        assert!(meets_minimum_length("123456"));
        assert!(meets_minimum_length("mậtkhẩu"));
    }

    #[tokio::test]
    async fn blocking_variants_agree_with_inline() {
        let hash = hash_password_blocking("password".to_string()).await.unwrap();
        assert!(verify_password(&hash, "password"));
        assert!(verify_password_blocking(hash.clone(), "password".to_string()).await.unwrap());
        assert!(!verify_password_blocking(hash, "wrong".to_string()).await.unwrap());
    }
}

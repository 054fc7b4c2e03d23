//! Credential handling: session tokens, password hashes, and third-party identity tokens.

pub mod identity;
pub mod password;
pub mod session;

pub use identity::{ExternalClaim, GoogleTokenVerifier, IdentityVerifier, VerificationError};
pub use session::{SessionClaims, SessionError, SessionIssuer};

//! Identity token verification
//!
//! Verifies the id tokens presented by portal users, both on the
//! authorized HTTP routes (Bearer header) and inside MCP tool calls
//! (token passed as a tool argument). Verification is signature-based
//! against the identity provider's published JWKS.

pub mod jwks;
pub mod verifier;

pub use jwks::JwksKeys;
pub use verifier::JwksVerifier;

use async_trait::async_trait;
use thiserror::Error;

/// Identity extracted from a successfully verified token.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
    /// Stable subject id assigned by the identity provider.
    pub subject: String,
    /// Email claim; the portal keys developer records by email, so a
    /// verified token without one cannot be mapped to a developer.
    pub email: Option<String>,
}

/// Errors that can occur while verifying an identity token.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("token expired")]
    TokenExpired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid issuer")]
    InvalidIssuer,

    #[error("invalid audience")]
    InvalidAudience,

    #[error("missing required claim: {0}")]
    MissingClaim(String),

    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid token format: {0}")]
    InvalidToken(String),
}

/// Trait for verifying identity tokens.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and extract the caller's identity.
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerificationError>;
}

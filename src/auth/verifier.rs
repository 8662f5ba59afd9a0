//! JWKS-backed identity token verification.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;

use super::jwks::JwksKeys;
use super::{TokenVerifier, VerificationError, VerifiedUser};

/// Raw claims carried by an id token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    /// Subject id
    sub: String,
    /// Email the portal keys developers by
    #[serde(default)]
    email: Option<String>,
    /// Expiration timestamp (validated by jsonwebtoken)
    #[allow(dead_code)]
    exp: u64,
}

/// Verifies RS256-signed id tokens against the provider's JWKS.
pub struct JwksVerifier {
    keys: JwksKeys,
    issuer: String,
    audience: String,
}

impl JwksVerifier {
    pub fn new(jwks_url: &str, issuer: &str, audience: &str) -> Self {
        Self {
            keys: JwksKeys::new(jwks_url),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerificationError> {
        // Decode header to get key ID
        let header =
            decode_header(token).map_err(|e| VerificationError::InvalidToken(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| VerificationError::MissingClaim("kid".to_string()))?;

        let key = self.keys.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;

        let token_data = decode::<IdTokenClaims>(token, &key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    VerificationError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => VerificationError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    VerificationError::InvalidAudience
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    VerificationError::InvalidSignature
                }
                _ => VerificationError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = token_data.claims;

        Ok(VerifiedUser {
            subject: claims.sub,
            email: claims.email,
        })
    }
}

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Fetches the identity provider's public signing keys and caches them,
//! refreshing when a lookup misses a stale cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::VerificationError;

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS document as served by the identity provider.
#[derive(Debug, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwkKey>,
}

/// A single JWK.
#[derive(Debug, Deserialize)]
pub struct JwkKey {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// RSA modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public exponent (base64url encoded).
    pub e: Option<String>,
    /// Algorithm (e.g., "RS256").
    pub alg: Option<String>,
}

/// Cached keys with their fetch time.
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

impl Default for CachedKeys {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
            // Set to far past so first access triggers fetch
            fetched_at: Instant::now()
                .checked_sub(Duration::from_secs(3600))
                .unwrap_or_else(Instant::now),
        }
    }
}

/// JWKS key provider that fetches and caches signing keys.
pub struct JwksKeys {
    jwks_url: String,
    refresh_interval: Duration,
    client: reqwest::Client,
    cache: RwLock<CachedKeys>,
}

impl JwksKeys {
    pub fn new(jwks_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create JWKS HTTP client");

        Self {
            jwks_url: jwks_url.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            client,
            cache: RwLock::new(CachedKeys::default()),
        }
    }

    /// Get a decoding key by key ID, fetching the JWKS if the cache is
    /// stale or the key is unknown.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, VerificationError> {
        {
            let cache = self.cache.read().await;
            if cache.fetched_at.elapsed() < self.refresh_interval {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        self.refresh_keys().await?;

        let cache = self.cache.read().await;
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| VerificationError::KeyNotFound(kid.to_string()))
    }

    async fn refresh_keys(&self) -> Result<(), VerificationError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response: JwksResponse = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerificationError::JwksFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| VerificationError::JwksFetchFailed(e.to_string()))?;

        let mut new_keys = HashMap::new();

        for key in response.keys {
            if let Some(kid) = &key.kid {
                if let Some(decoding_key) = Self::parse_key(&key)? {
                    new_keys.insert(kid.clone(), decoding_key);
                }
            }
        }

        debug!("Cached {} JWKS keys", new_keys.len());

        let mut cache = self.cache.write().await;
        cache.keys = new_keys;
        cache.fetched_at = Instant::now();

        Ok(())
    }

    /// Parse a JWK into a `DecodingKey`. Unsupported key types are
    /// skipped rather than failing the whole fetch.
    fn parse_key(key: &JwkKey) -> Result<Option<DecodingKey>, VerificationError> {
        match key.kty.as_str() {
            "RSA" => {
                let n = key
                    .n
                    .as_ref()
                    .ok_or_else(|| VerificationError::InvalidToken("missing n parameter".to_string()))?;
                let e = key
                    .e
                    .as_ref()
                    .ok_or_else(|| VerificationError::InvalidToken("missing e parameter".to_string()))?;

                let decoding_key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| VerificationError::InvalidToken(format!("invalid RSA key: {}", e)))?;

                Ok(Some(decoding_key))
            }
            other => {
                warn!("Skipping JWK with unsupported key type: {}", other);
                Ok(None)
            }
        }
    }
}

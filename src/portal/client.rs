//! HTTP client for the developer portal management service.
//!
//! The portal agent manages developers, their apps, and product
//! subscriptions. All operations resolve to the same envelope: `data` on
//! success, `error{code,message}` on failure. The gateway forwards both
//! sides to its own callers without translation, so this client's only
//! job is faithful envelope unwrapping.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::models::PortalEnvelope;
use crate::hub::UpstreamError;

/// Operations consumed from the portal management service.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Register a new developer record.
    async fn create_developer(&self, developer: &Value) -> Result<Value, UpstreamError>;

    /// List a developer's apps.
    async fn get_apps(&self, email: &str) -> Result<Value, UpstreamError>;

    /// Create an app for a developer.
    async fn create_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError>;

    /// Delete a developer's app.
    async fn delete_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError>;

    /// List the API products available for subscription.
    async fn get_products(&self) -> Result<Value, UpstreamError>;

    /// Subscribe an app key to one or more products.
    async fn add_app_key_products(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        products: &[String],
    ) -> Result<Value, UpstreamError>;

    /// Remove one product subscription from an app key.
    async fn remove_app_key_product(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        product_name: &str,
    ) -> Result<Value, UpstreamError>;
}

/// Reqwest-based portal client.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a request and unwrap the portal envelope.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        match serde_json::from_str::<PortalEnvelope>(&body) {
            Ok(envelope) => {
                if let Some(error) = envelope.error {
                    debug!("Portal error {}: {}", error.code, error.message);
                    return Err(UpstreamError::new(error.code, error.message));
                }
                if !status.is_success() {
                    return Err(UpstreamError::new(status.as_u16(), body));
                }
                Ok(envelope.data.unwrap_or(Value::Null))
            }
            Err(_) if !status.is_success() => Err(UpstreamError::new(status.as_u16(), body)),
            Err(e) => Err(UpstreamError::transport(format!(
                "Unparseable portal response: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn create_developer(&self, developer: &Value) -> Result<Value, UpstreamError> {
        let url = format!("{}/developers", self.base_url);
        self.execute(self.client.post(&url).json(developer)).await
    }

    async fn get_apps(&self, email: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/developers/{}/apps", self.base_url, email);
        self.execute(self.client.get(&url)).await
    }

    async fn create_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/developers/{}/apps", self.base_url, email);
        let body = serde_json::json!({ "name": app_name });
        self.execute(self.client.post(&url).json(&body)).await
    }

    async fn delete_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/developers/{}/apps/{}", self.base_url, email, app_name);
        self.execute(self.client.delete(&url)).await
    }

    async fn get_products(&self) -> Result<Value, UpstreamError> {
        let url = format!("{}/products", self.base_url);
        self.execute(self.client.get(&url)).await
    }

    async fn add_app_key_products(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        products: &[String],
    ) -> Result<Value, UpstreamError> {
        let url = format!(
            "{}/developers/{}/apps/{}/keys/{}/products",
            self.base_url, email, app_name, key_name
        );
        let body = serde_json::json!({ "products": products });
        self.execute(self.client.put(&url).json(&body)).await
    }

    async fn remove_app_key_product(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        product_name: &str,
    ) -> Result<Value, UpstreamError> {
        let url = format!(
            "{}/developers/{}/apps/{}/keys/{}/products/{}",
            self.base_url, email, app_name, key_name, product_name
        );
        self.execute(self.client.delete(&url)).await
    }
}

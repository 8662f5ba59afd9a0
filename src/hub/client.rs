//! HTTP client for the external API hub service.

use async_trait::async_trait;
use std::time::Duration;

use super::models::{
    HubApi, HubDeployment, HubSpecContents, HubVersion, ListApisResponse, ListSpecsResponse,
    ListVersionsResponse, SpecRef,
};
use super::UpstreamError;

/// Read access to the hub catalog.
///
/// All operations are idempotent reads. Errors keep the upstream status code
/// and message; point lookups answer `Ok(None)` on upstream 404 instead.
#[async_trait]
pub trait ApiHub: Send + Sync {
    /// List APIs matching an opaque upstream filter expression.
    /// No match is an empty list, not an error.
    async fn list_apis(&self, filter: &str) -> Result<Vec<HubApi>, UpstreamError>;

    /// List the versions of an API, in upstream order.
    async fn list_versions(&self, api_name: &str) -> Result<Vec<HubVersion>, UpstreamError>;

    /// Resolve one deployment reference.
    async fn get_deployment(
        &self,
        deployment_ref: &str,
    ) -> Result<Option<HubDeployment>, UpstreamError>;

    /// List the spec references attached to a version.
    async fn list_version_specs(&self, version_name: &str) -> Result<Vec<SpecRef>, UpstreamError>;

    /// Fetch the payload of one spec reference.
    async fn get_spec_contents(
        &self,
        spec_ref: &str,
    ) -> Result<Option<HubSpecContents>, UpstreamError>;
}

/// HTTP client for communicating with the API hub.
pub struct ApiHubClient {
    client: reqwest::Client,
    base_url: String,
    /// `projects/{project}/locations/{region}` prefix for collection listings.
    parent: String,
}

impl ApiHubClient {
    /// Create a new hub client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the hub service (e.g., "https://apihub.googleapis.com")
    /// * `project_id` - Cloud project hosting the catalog
    /// * `region` - Catalog location
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, project_id: &str, region: &str, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        let parent = format!("projects/{}/locations/{}", project_id, region);

        Self {
            client,
            base_url,
            parent,
        }
    }

    /// Get the base URL of the hub service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the `projects/{p}/locations/{r}` parent path.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// GET a resource path, surfacing non-success as `UpstreamError`.
    async fn get(
        &self,
        path: &str,
        query: Option<(&str, &str)>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = format!("{}/v1/{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some((key, value)) = query {
            request = request.query(&[(key, value)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(format!("hub request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(UpstreamError::new(status.as_u16(), message));
        }

        Ok(response)
    }

    /// Like `get`, but upstream 404 becomes `Ok(None)`.
    async fn get_optional(
        &self,
        path: &str,
    ) -> Result<Option<reqwest::Response>, UpstreamError> {
        match self.get(path, None).await {
            Ok(response) => Ok(Some(response)),
            Err(err) if err.code == 404 => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl ApiHub for ApiHubClient {
    async fn list_apis(&self, filter: &str) -> Result<Vec<HubApi>, UpstreamError> {
        let path = format!("{}/apis", self.parent);
        let response = self.get(&path, Some(("filter", filter))).await?;

        let body: ListApisResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("bad apis listing: {}", e)))?;
        Ok(body.apis)
    }

    async fn list_versions(&self, api_name: &str) -> Result<Vec<HubVersion>, UpstreamError> {
        let path = format!("{}/versions", api_name);
        let response = self.get(&path, None).await?;

        let body: ListVersionsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("bad versions listing: {}", e)))?;
        Ok(body.versions)
    }

    async fn get_deployment(
        &self,
        deployment_ref: &str,
    ) -> Result<Option<HubDeployment>, UpstreamError> {
        let Some(response) = self.get_optional(deployment_ref).await? else {
            return Ok(None);
        };

        let deployment = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("bad deployment body: {}", e)))?;
        Ok(Some(deployment))
    }

    async fn list_version_specs(&self, version_name: &str) -> Result<Vec<SpecRef>, UpstreamError> {
        let path = format!("{}/specs", version_name);
        let response = self.get(&path, None).await?;

        let body: ListSpecsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("bad specs listing: {}", e)))?;
        Ok(body.specs)
    }

    async fn get_spec_contents(
        &self,
        spec_ref: &str,
    ) -> Result<Option<HubSpecContents>, UpstreamError> {
        let path = format!("{}:contents", spec_ref);
        let Some(response) = self.get_optional(&path).await? else {
            return Ok(None);
        };

        let contents = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("bad spec contents body: {}", e)))?;
        Ok(Some(contents))
    }
}

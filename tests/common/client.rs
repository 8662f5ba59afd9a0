//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all gateway endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    /// GET /apis
    pub async fn get_apis(&self) -> Response {
        self.client
            .get(format!("{}/apis", self.base_url))
            .send()
            .await
            .expect("Get apis request failed")
    }

    /// GET /api-spec?version={version}
    pub async fn get_api_spec(&self, version: &str) -> Response {
        self.client
            .get(format!("{}/api-spec", self.base_url))
            .query(&[("version", version)])
            .send()
            .await
            .expect("Get api spec request failed")
    }

    /// POST /cache-refresh
    pub async fn post_cache_refresh(&self) -> Response {
        self.client
            .post(format!("{}/cache-refresh", self.base_url))
            .send()
            .await
            .expect("Cache refresh request failed")
    }

    /// GET /config
    pub async fn get_config(&self) -> Response {
        self.client
            .get(format!("{}/config", self.base_url))
            .send()
            .await
            .expect("Get config request failed")
    }

    // ========================================================================
    // Portal Endpoints
    // ========================================================================

    /// POST /users
    pub async fn create_user(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/users", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create user request failed")
    }

    /// GET /users/{email}/apps
    pub async fn get_user_apps(&self, email: &str, token: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/users/{}/apps", self.base_url, email));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Get user apps request failed")
    }

    /// POST /users/{email}/apps
    pub async fn create_app(&self, email: &str, app_name: &str, token: Option<&str>) -> Response {
        let mut request = self
            .client
            .post(format!("{}/users/{}/apps", self.base_url, email))
            .json(&json!({ "name": app_name }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Create app request failed")
    }

    /// DELETE /users/{email}/apps/{app_name}
    pub async fn delete_app(&self, email: &str, app_name: &str, token: Option<&str>) -> Response {
        let mut request = self.client.delete(format!(
            "{}/users/{}/apps/{}",
            self.base_url, email, app_name
        ));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Delete app request failed")
    }

    /// GET /products
    pub async fn get_products(&self) -> Response {
        self.client
            .get(format!("{}/products", self.base_url))
            .send()
            .await
            .expect("Get products request failed")
    }

    /// PUT /users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}
    pub async fn add_key_product(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        product_name: &str,
        token: Option<&str>,
    ) -> Response {
        let mut request = self.client.put(format!(
            "{}/users/{}/apps/{}/keys/{}/products/{}",
            self.base_url, email, app_name, key_name, product_name
        ));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Add key product request failed")
    }

    /// DELETE /users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}
    pub async fn remove_key_product(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        product_name: &str,
        token: Option<&str>,
    ) -> Response {
        let mut request = self.client.delete(format!(
            "{}/users/{}/apps/{}/keys/{}/products/{}",
            self.base_url, email, app_name, key_name, product_name
        ));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .expect("Remove key product request failed")
    }

    // ========================================================================
    // MCP Endpoints
    // ========================================================================

    /// POST /mcp with an optional session header
    pub async fn mcp_post(&self, body: &Value, session_id: Option<&str>) -> Response {
        let mut request = self
            .client
            .post(format!("{}/mcp", self.base_url))
            .json(body);
        if let Some(id) = session_id {
            request = request.header("mcp-session-id", id);
        }
        request.send().await.expect("MCP POST request failed")
    }

    /// GET /mcp (SSE stream) with an optional session header
    pub async fn mcp_get(&self, session_id: Option<&str>) -> Response {
        let mut request = self.client.get(format!("{}/mcp", self.base_url));
        if let Some(id) = session_id {
            request = request.header("mcp-session-id", id);
        }
        request.send().await.expect("MCP GET request failed")
    }

    /// DELETE /mcp with an optional session header
    pub async fn mcp_delete(&self, session_id: Option<&str>) -> Response {
        let mut request = self.client.delete(format!("{}/mcp", self.base_url));
        if let Some(id) = session_id {
            request = request.header("mcp-session-id", id);
        }
        request.send().await.expect("MCP DELETE request failed")
    }

    /// Runs the full initialize handshake and returns the session id
    ///
    /// # Panics
    ///
    /// Panics if the handshake fails (indicates test infrastructure problem).
    pub async fn mcp_initialize(&self) -> String {
        let response = self
            .mcp_post(
                &json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "initialize",
                    "params": {
                        "protocolVersion": "2024-11-05",
                        "capabilities": {},
                        "clientInfo": { "name": "e2e-tests", "version": "0.0.0" }
                    }
                }),
                None,
            )
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "initialize failed: {:?}",
            response.text().await
        );

        let session_id = response
            .headers()
            .get("mcp-session-id")
            .expect("initialize response missing session id header")
            .to_str()
            .expect("session id is not valid ascii")
            .to_string();

        // Complete the handshake
        let response = self
            .mcp_post(
                &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
                Some(&session_id),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        session_id
    }

    /// Calls a tool over an open session and returns the JSON-RPC response
    pub async fn mcp_call_tool(&self, session_id: &str, tool: &str, arguments: Value) -> Value {
        let response = self
            .mcp_post(
                &json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/call",
                    "params": { "name": tool, "arguments": arguments }
                }),
                Some(session_id),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("tools/call response not JSON")
    }
}

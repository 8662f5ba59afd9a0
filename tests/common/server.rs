//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server wired to its own in-memory upstream
//! fakes.

use super::constants::*;
use super::fixtures::{FakeApiHub, FakePortal, FakeVerifier};
use apihub_portal::cache::CatalogCache;
use apihub_portal::config::ClientConfig;
use apihub_portal::hub::ApiHub;
use apihub_portal::mcp::create_mcp_state;
use apihub_portal::portal::PortalApi;
use apihub_portal::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Client settings every test server hands out on GET /config
pub fn test_client_config() -> ClientConfig {
    ClientConfig {
        service_url: Some("http://localhost:8080".to_string()),
        apigee_agent_url: Some("http://localhost:8081".to_string()),
        auth_api_key: Some("test-api-key".to_string()),
        auth_domain: Some("test.firebaseapp.com".to_string()),
    }
}

/// Test server instance with isolated upstream fakes
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Hub fake, for reshaping the catalog or injecting failures mid-test
    pub hub: Arc<FakeApiHub>,

    /// Portal fake, for injecting upstream failures mid-test
    pub portal: Arc<FakePortal>,

    /// The catalog cache backing the server, for direct refreshes in tests
    pub cache: Arc<CatalogCache>,

    // Private field - keeps the server alive until drop
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with the demo catalog and
    /// the pre-seeded test developer.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            Arc::new(FakeApiHub::demo_catalog()),
            Arc::new(FakePortal::with_test_developer()),
        )
        .await
    }

    /// Spawns a test server around the given upstream fakes.
    ///
    /// This function:
    /// 1. Builds the catalog cache and kicks off the initial refresh
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// The initial refresh runs in the background, same as production
    /// startup; catalog routes wait for it on their own.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Port binding fails
    /// - Server fails to start
    /// - Server doesn't become ready within timeout
    pub async fn spawn_with(hub: Arc<FakeApiHub>, portal: Arc<FakePortal>) -> Self {
        let cache = Arc::new(CatalogCache::new(hub.clone() as Arc<dyn ApiHub>));
        cache.spawn_refresh();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Build the app
        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            client_config: test_client_config(),
        };

        let app = make_app(
            config,
            hub.clone() as Arc<dyn ApiHub>,
            portal.clone() as Arc<dyn PortalApi>,
            cache.clone(),
            Arc::new(FakeVerifier),
            create_mcp_state(),
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        // Wait for server to be ready
        let server = Self {
            base_url,
            port,
            hub,
            portal,
            cache,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

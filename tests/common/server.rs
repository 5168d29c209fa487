//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own service, cache and
//! upstream catalog.

use super::constants::*;
use super::fixtures::default_catalog;
use super::stub_catalog::StubCatalog;
use release_radar_server::catalog_client::CatalogClient;
use release_radar_server::config::NewReleasesSettings;
use release_radar_server::new_releases::NewReleasesService;
use release_radar_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Max-age advertised by test servers
pub const TEST_CONTENT_CACHE_AGE_SEC: usize = 30;

/// Test server instance backed by an isolated upstream catalog
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The stub upstream, for call-count assertions. `None` when the server
    /// was spawned over another client.
    pub catalog: Option<Arc<StubCatalog>>,

    // Private fields - keep resources alive until drop
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server over the default fixture catalog
    pub async fn spawn() -> Self {
        Self::spawn_with(default_catalog()).await
    }

    /// Spawns a new test server over the given stub catalog
    pub async fn spawn_with(catalog: StubCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let mut server = Self::spawn_with_client(catalog.clone()).await;
        server.catalog = Some(catalog);
        server
    }

    /// Spawns a new test server over any catalog client
    ///
    /// This function:
    /// 1. Builds the new releases service with default settings
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within timeout.
    pub async fn spawn_with_client(client: Arc<dyn CatalogClient>) -> Self {
        let service = Arc::new(NewReleasesService::new(
            client,
            &NewReleasesSettings {
                request_deadline: Duration::from_secs(5),
                ..Default::default()
            },
        ));

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

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: TEST_CONTENT_CACHE_AGE_SEC,
        };
        let app = make_app(config, service);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog: None,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// The stub catalog; panics for servers spawned over another client.
    pub fn stub(&self) -> &StubCatalog {
        self.catalog
            .as_deref()
            .expect("Server was not spawned over a stub catalog")
    }

    /// Waits for the server to become ready by polling the status endpoint
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
                Ok(response) if response.status().is_success() => return,
                _ => {
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

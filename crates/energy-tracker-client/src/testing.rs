//! Test utilities for energy-tracker-client
//!
//! - [`MockServer`]: serves an axum router on a private runtime thread, so
//!   it works for both async and blocking clients.
//! - [`SpyTransport`]: a transport that replays queued responses and counts
//!   calls and releases without touching the network.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::{BlockingTransport, Transport};

/// Access token used by [`MockServer::config`]
pub const TEST_TOKEN: &str = "test-token";

/// A test server that shuts down when dropped
pub struct MockServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Serve a router on an ephemeral local port
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use energy_tracker_client::testing::MockServer;
    /// use energy_tracker_client::EnergyTrackerClient;
    ///
    /// let router = Router::new().route("/v1/devices/standard", get(|| async { Json(vec![]) }));
    /// let server = MockServer::start(router)?;
    /// let client = EnergyTrackerClient::with_config(server.config())?;
    /// let devices = client.devices().list_standard().await?;
    /// ```
    pub fn start(router: axum::Router) -> Result<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let handle = std::thread::Builder::new()
            .name("mock-server".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => listener,
                        Err(e) => {
                            tracing::error!("Mock server failed to register listener: {}", e);
                            return;
                        }
                    };
                    axum::serve(listener, router)
                        .with_graceful_shutdown(async {
                            let _ = shutdown_rx.await;
                        })
                        .await
                        .ok();
                });
            })?;

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::builder(TEST_TOKEN)
            .base_url(self.base_url())
            .timeout(Duration::from_secs(5))
            .build()
    }

    /// Client configuration pointing at this server with a custom timeout
    pub fn config_with_timeout(&self, timeout: Duration) -> ClientConfig {
        ClientConfig::builder(TEST_TOKEN)
            .base_url(self.base_url())
            .timeout(timeout)
            .build()
    }

    /// Shutdown the server and wait for it to stop
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        // Signal only; the server thread winds down on its own
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Transport double that records requests and replays canned responses
///
/// When no response is queued, `execute` fails with a network error.
#[derive(Default)]
pub struct SpyTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
    releases: AtomicUsize,
    closed: Mutex<bool>,
}

impl SpyTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response (builder style)
    pub fn with_response(self, response: ApiResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Queue a JSON response
    pub fn with_json(self, status: StatusCode, body: serde_json::Value) -> Self {
        self.with_response(ApiResponse::from_json(status, &body))
    }

    pub fn push_response(&self, response: ApiResponse) {
        self.responses.lock().push_back(response);
    }

    /// Number of `execute` calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of times the connection resource was actually released
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().last().cloned()
    }

    fn respond(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.closed.lock() {
            return Err(Error::Closed);
        }
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Network("no response queued".to_string()))
    }

    fn release(&self) -> bool {
        let mut closed = self.closed.lock();
        if *closed {
            return false;
        }
        *closed = true;
        self.releases.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.respond(request)
    }

    fn close(&self) -> bool {
        self.release()
    }
}

impl BlockingTransport for SpyTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.respond(request)
    }

    fn close(&self) -> bool {
        self.release()
    }
}

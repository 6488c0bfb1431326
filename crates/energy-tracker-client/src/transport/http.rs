//! Async HTTP transport

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;

use super::{map_reqwest_error, ConnectionSlot, Transport};
use crate::config::TransportSettings;
use crate::error::{Error, Result};
use crate::request::{ApiRequest, ApiResponse};

/// Async transport over a pooled `reqwest::Client`
///
/// The pool is built on the first request and shared by all concurrent
/// requests of the owning client.
pub struct HttpTransport {
    settings: Arc<TransportSettings>,
    slot: ConnectionSlot<Client>,
}

impl HttpTransport {
    pub fn new(settings: Arc<TransportSettings>) -> Self {
        Self {
            settings,
            slot: ConnectionSlot::new(),
        }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Whether the connection pool has been created and not yet released
    pub fn is_connected(&self) -> bool {
        self.slot.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.slot.is_closed()
    }

    fn build_client(settings: &TransportSettings) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, settings.authorization.clone());

        Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(format!("failed to initialise HTTP client: {}", e)))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.settings.base_url)
            .field("timeout", &self.settings.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let client = self.slot.acquire(|| Self::build_client(&self.settings))?;
        let url = request.url(&self.settings.base_url)?;
        let timeout = self.settings.timeout;

        debug!(method = %request.method, path = %request.path, "Sending request");

        let mut builder = client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "Received response"
        );

        Ok(ApiResponse::new(status, headers, body))
    }

    fn close(&self) -> bool {
        let (client, released) = self.slot.close();
        if released {
            debug!(had_pool = client.is_some(), "Released HTTP connection pool");
        }
        released
    }
}

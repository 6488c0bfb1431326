//! Blocking HTTP transport

use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use tracing::debug;

use super::{map_reqwest_error, BlockingTransport, ConnectionSlot};
use crate::config::TransportSettings;
use crate::error::{Error, Result};
use crate::request::{ApiRequest, ApiResponse};

/// Blocking transport over a pooled `reqwest::blocking::Client`
///
/// Must not be used from within an async runtime; `reqwest` runs its own
/// runtime thread behind the blocking client.
pub struct BlockingHttpTransport {
    settings: Arc<TransportSettings>,
    slot: ConnectionSlot<Client>,
}

impl BlockingHttpTransport {
    pub fn new(settings: Arc<TransportSettings>) -> Self {
        Self {
            settings,
            slot: ConnectionSlot::new(),
        }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

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

impl std::fmt::Debug for BlockingHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingHttpTransport")
            .field("base_url", &self.settings.base_url)
            .field("timeout", &self.settings.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let client = self.slot.acquire(|| Self::build_client(&self.settings))?;
        let url = request.url(&self.settings.base_url)?;
        let timeout = self.settings.timeout;

        debug!(method = %request.method, path = %request.path, "Sending request");

        let mut builder = client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| map_reqwest_error(e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn transport() -> BlockingHttpTransport {
        let settings = ClientConfig::builder("test-token")
            .base_url("http://127.0.0.1:9")
            .build()
            .validate()
            .unwrap();
        BlockingHttpTransport::new(Arc::new(settings))
    }

    #[test]
    fn test_close_before_use() {
        let transport = transport();
        assert!(!transport.is_connected());
        assert!(transport.close());
        assert!(!transport.close());

        let result = transport.execute(ApiRequest::get("/v1/devices/virtual"));
        assert!(matches!(result, Err(Error::Closed)));
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let transport = transport();
        let result = transport.execute(ApiRequest::get("/v1/devices/virtual"));
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(transport.close());
    }
}

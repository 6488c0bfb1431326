//! Energy Tracker HTTP client implementation

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::{ApiRequest, ApiResponse};
use crate::resources::{Devices, Environments, MeterReadings};
use crate::transport::{HttpTransport, Transport};

/// Energy Tracker REST API client
///
/// Owns one transport and therefore one connection pool. The pool is
/// created on the first request and released when the client is closed or
/// dropped, whichever happens first.
pub struct EnergyTrackerClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl EnergyTrackerClient {
    /// Create a client for the public API with the default timeout
    ///
    /// # Arguments
    /// * `access_token` - Personal access token from the Energy Tracker app
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(access_token))
    }

    /// Create a client from a full configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let settings = Arc::new(config.validate()?);
        debug!(base_url = %settings.base_url, timeout = ?settings.timeout, "Creating client");
        Ok(Self {
            transport: Arc::new(HttpTransport::new(settings)),
            config,
        })
    }

    /// Create a client over a caller-supplied transport
    ///
    /// The configuration is kept for reference only; base URL, credentials
    /// and timeout are the transport's concern.
    ///
    /// The client takes exclusive ownership of the transport and closes it
    /// on drop. Do not hand the same transport to another client.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    /// Device listings
    pub fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    /// Meter readings of standard devices
    pub fn meter_readings(&self) -> MeterReadings<'_> {
        MeterReadings::new(self)
    }

    /// Environment records of standard devices
    pub fn environments(&self) -> Environments<'_> {
        Environments::new(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Release the connection pool
    ///
    /// Later calls fail with [`Error::Closed`](crate::Error::Closed).
    /// Returns `true` if this call performed the release.
    pub fn close(&self) -> bool {
        self.transport.close()
    }

    /// Send a request and classify error statuses
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.execute(request).await?.error_for_status()
    }
}

impl fmt::Debug for EnergyTrackerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnergyTrackerClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for EnergyTrackerClient {
    fn drop(&mut self) {
        if self.transport.close() {
            debug!("Client dropped, connection pool released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::SpyTransport;
    use reqwest::StatusCode;

    #[test]
    fn test_new_rejects_empty_token() {
        let err = EnergyTrackerClient::new("").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_with_config_keeps_config() {
        let config = ClientConfig::builder("secret-token")
            .base_url("http://localhost:8080/")
            .build();
        let client = EnergyTrackerClient::with_config(config).unwrap();
        assert_eq!(client.config().normalized_base_url(), "http://localhost:8080");
        assert!(!format!("{:?}", client).contains("secret-token"));
    }

    #[test]
    fn test_drop_releases_once() {
        let spy = Arc::new(SpyTransport::new());
        let client = EnergyTrackerClient::with_transport(ClientConfig::new("t"), spy.clone());
        assert!(client.close());
        drop(client);
        assert_eq!(spy.releases(), 1);
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let spy = Arc::new(SpyTransport::new().with_json(StatusCode::OK, serde_json::json!([])));
        let client = EnergyTrackerClient::with_transport(ClientConfig::new("t"), spy.clone());
        client.close();

        let err = client.devices().list_standard().await.unwrap_err();
        assert!(matches!(err, Error::Closed));
        assert!(spy.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_classifies_server_error() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({"message": "maintenance"}),
        ));
        let client = EnergyTrackerClient::with_transport(ClientConfig::new("t"), spy.clone());

        let err = client.send(ApiRequest::get("/x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error: 503");
        assert_eq!(err.api_message(), ["maintenance".to_string()]);
    }
}

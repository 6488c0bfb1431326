use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::resources::{Devices, Environments, MeterReadings};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::{BlockingHttpTransport, BlockingTransport};

/// Blocking Energy Tracker REST API client
///
/// Mirrors [`crate::EnergyTrackerClient`]; the connection pool is released
/// on [`close`](Self::close) or drop.
pub struct EnergyTrackerClient {
    transport: Arc<dyn BlockingTransport>,
    config: ClientConfig,
}

impl EnergyTrackerClient {
    /// Create a client for the public API with the default timeout
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(access_token))
    }

    /// Create a client from a full configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let settings = Arc::new(config.validate()?);
        debug!(base_url = %settings.base_url, timeout = ?settings.timeout, "Creating blocking client");
        Ok(Self {
            transport: Arc::new(BlockingHttpTransport::new(settings)),
            config,
        })
    }

    /// Create a client over a caller-supplied transport
    ///
    /// The transport must not be shared with another client: it is closed
    /// when this client is closed or dropped.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn BlockingTransport>) -> Self {
        Self { transport, config }
    }

    pub fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    pub fn meter_readings(&self) -> MeterReadings<'_> {
        MeterReadings::new(self)
    }

    pub fn environments(&self) -> Environments<'_> {
        Environments::new(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Release the connection pool; returns `true` if this call released it
    pub fn close(&self) -> bool {
        self.transport.close()
    }

    pub(crate) fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.execute(request)?.error_for_status()
    }
}

impl fmt::Debug for EnergyTrackerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("blocking::EnergyTrackerClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for EnergyTrackerClient {
    fn drop(&mut self) {
        if self.transport.close() {
            debug!("Blocking client dropped, connection pool released");
        }
    }
}

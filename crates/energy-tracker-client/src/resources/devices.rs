//! Device listings

use tracing::instrument;

use crate::client::EnergyTrackerClient;
use crate::error::Result;
use crate::models::{DeviceFilter, DeviceSummary};
use crate::request::ApiRequest;

/// Device category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Physical measuring devices
    Standard,
    /// Devices computed from other devices
    Virtual,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Virtual => "virtual",
        }
    }
}

/// `GET /v1/devices/{kind}`
pub(crate) fn list_request(kind: DeviceKind, filter: &DeviceFilter) -> ApiRequest {
    filter.apply(ApiRequest::get(format!("/v1/devices/{}", kind.as_str())))
}

/// Device operations
pub struct Devices<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> Devices<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    /// List all standard measuring devices
    pub async fn list_standard(&self) -> Result<Vec<DeviceSummary>> {
        self.list_standard_with(&DeviceFilter::default()).await
    }

    /// List standard devices matching a filter
    #[instrument(skip(self))]
    pub async fn list_standard_with(&self, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.list(DeviceKind::Standard, filter).await
    }

    /// List all virtual measuring devices
    pub async fn list_virtual(&self) -> Result<Vec<DeviceSummary>> {
        self.list_virtual_with(&DeviceFilter::default()).await
    }

    /// List virtual devices matching a filter
    #[instrument(skip(self))]
    pub async fn list_virtual_with(&self, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.list(DeviceKind::Virtual, filter).await
    }

    async fn list(&self, kind: DeviceKind, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.client
            .send(list_request(kind, filter))
            .await?
            .json()
    }
}

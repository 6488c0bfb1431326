//! Blocking resource façades over the shared request builders

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::client::EnergyTrackerClient;
use crate::error::Result;
use crate::models::{
    CreateEnvironmentEntry, CreateEnvironmentRecord, CreateMeterReading, DeviceFilter,
    DeviceSummary, EnvironmentRecord, ExportMeterReadings, MeterReading, MeterReadingQuery,
};
use crate::resources::{devices, environments, meter_readings, DeviceKind};

/// Device operations
pub struct Devices<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> Devices<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    pub fn list_standard(&self) -> Result<Vec<DeviceSummary>> {
        self.list_standard_with(&DeviceFilter::default())
    }

    #[instrument(skip(self))]
    pub fn list_standard_with(&self, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.list(DeviceKind::Standard, filter)
    }

    pub fn list_virtual(&self) -> Result<Vec<DeviceSummary>> {
        self.list_virtual_with(&DeviceFilter::default())
    }

    #[instrument(skip(self))]
    pub fn list_virtual_with(&self, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.list(DeviceKind::Virtual, filter)
    }

    fn list(&self, kind: DeviceKind, filter: &DeviceFilter) -> Result<Vec<DeviceSummary>> {
        self.client.send(devices::list_request(kind, filter))?.json()
    }
}

/// Meter reading operations
pub struct MeterReadings<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> MeterReadings<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub fn list(&self, device_id: &str, query: &MeterReadingQuery) -> Result<Vec<MeterReading>> {
        let request = meter_readings::list_request(device_id, query)?;
        self.client.send(request)?.json()
    }

    /// Submit a new reading and return the record stored by the server
    #[instrument(skip(self, reading), fields(value = %reading.value()))]
    pub fn create(
        &self,
        device_id: &str,
        reading: &CreateMeterReading,
        allow_rounding: Option<bool>,
    ) -> Result<MeterReading> {
        let request = meter_readings::create_request(device_id, reading, allow_rounding)?;
        let created: MeterReading = self.client.send(request)?.json()?;
        tracing::info!(device_id, timestamp = %created.timestamp, "Created meter reading");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, device_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let request = meter_readings::delete_request(device_id, timestamp)?;
        self.client.send(request)?;
        tracing::info!(device_id, %timestamp, "Deleted meter reading");
        Ok(())
    }

    /// Export readings as CSV, returned as raw bytes
    #[instrument(skip(self, export))]
    pub fn export(
        &self,
        device_id: &str,
        export: &ExportMeterReadings,
        query: &MeterReadingQuery,
    ) -> Result<Bytes> {
        let request = meter_readings::export_request(device_id, export, query)?;
        Ok(self.client.send(request)?.into_bytes())
    }
}

/// Environment record operations
pub struct Environments<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> Environments<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub fn list(&self, device_id: &str) -> Result<Vec<EnvironmentRecord>> {
        let request = environments::list_request(device_id)?;
        self.client.send(request)?.json()
    }

    #[instrument(skip(self))]
    pub fn get(&self, device_id: &str, environment_id: &str) -> Result<EnvironmentRecord> {
        let request = environments::get_request(device_id, environment_id)?;
        self.client.send(request)?.json()
    }

    #[instrument(skip(self, record), fields(title = record.title()))]
    pub fn create(&self, device_id: &str, record: &CreateEnvironmentRecord) -> Result<EnvironmentRecord> {
        let request = environments::create_request(device_id, record)?;
        let created: EnvironmentRecord = self.client.send(request)?.json()?;
        tracing::info!(device_id, environment_id = %created.id, "Created environment record");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, device_id: &str, environment_id: &str) -> Result<()> {
        let request = environments::delete_request(device_id, environment_id)?;
        self.client.send(request)?;
        tracing::info!(device_id, environment_id, "Deleted environment record");
        Ok(())
    }

    #[instrument(skip(self, entry), fields(value = %entry.value()))]
    pub fn create_entry(
        &self,
        device_id: &str,
        environment_id: &str,
        entry: &CreateEnvironmentEntry,
    ) -> Result<()> {
        let request = environments::create_entry_request(device_id, environment_id, entry)?;
        self.client.send(request)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_entry(
        &self,
        device_id: &str,
        environment_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let request = environments::delete_entry_request(device_id, environment_id, timestamp)?;
        self.client.send(request)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::{Method, StatusCode};
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{ApiErrorKind, Error};
    use crate::testing::SpyTransport;

    fn client_with(spy: &Arc<SpyTransport>) -> EnergyTrackerClient {
        EnergyTrackerClient::with_transport(ClientConfig::new("test-token"), spy.clone())
    }

    #[test]
    fn test_delete_empty_device_makes_no_call() {
        let spy = Arc::new(SpyTransport::new());
        let client = client_with(&spy);

        let err = client.meter_readings().delete("", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(spy.calls(), 0);
    }

    #[test]
    fn test_list_virtual() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::OK,
            serde_json::json!([{"id": "v1", "name": "Total", "folderPath": "/"}]),
        ));
        let client = client_with(&spy);

        let devices = client.devices().list_virtual().unwrap();
        assert_eq!(devices[0].id, "v1");
        assert_eq!(spy.last_request().unwrap().path, "/v1/devices/virtual");
    }

    #[test]
    fn test_create_reading_rate_limited() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({"message": "slow down"}),
        ));
        let client = client_with(&spy);

        let reading = CreateMeterReading::new(Decimal::new(1050, 1)).unwrap();
        let err = client
            .meter_readings()
            .create("dev-1", &reading, Some(true))
            .unwrap_err();

        assert_eq!(err.kind(), Some(&ApiErrorKind::RateLimited { retry_after: None }));
        let request = spy.last_request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.query.get("allowRounding").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_create_entry_and_delete_entry() {
        let spy = Arc::new(
            SpyTransport::new()
                .with_json(StatusCode::CREATED, serde_json::json!({}))
                .with_json(StatusCode::OK, serde_json::json!({})),
        );
        let client = client_with(&spy);

        let entry = CreateEnvironmentEntry::new(Decimal::new(-25, 1));
        client
            .environments()
            .create_entry("dev-1", "env-1", &entry)
            .unwrap();
        client
            .environments()
            .delete_entry("dev-1", "env-1", Utc::now())
            .unwrap();

        let requests = spy.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, Some(serde_json::json!({"value": "-2.5"})));
        assert_eq!(
            requests[1].path,
            "/v1/devices/standard/dev-1/environments/env-1/entries"
        );
    }
}

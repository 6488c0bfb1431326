//! Environment records (temperature, humidity, ...) of standard devices

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::client::EnergyTrackerClient;
use crate::error::Result;
use crate::models::{CreateEnvironmentEntry, CreateEnvironmentRecord, EnvironmentRecord, TimestampBody};
use crate::request::{validate_id, ApiRequest};

fn environments_path(device_id: &str) -> Result<String> {
    let device_id = validate_id("device_id", device_id)?;
    Ok(format!("/v1/devices/standard/{}/environments", device_id))
}

fn environment_path(device_id: &str, environment_id: &str) -> Result<String> {
    let base = environments_path(device_id)?;
    let environment_id = validate_id("environment_id", environment_id)?;
    Ok(format!("{}/{}", base, environment_id))
}

pub(crate) fn list_request(device_id: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::get(environments_path(device_id)?))
}

pub(crate) fn get_request(device_id: &str, environment_id: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::get(environment_path(device_id, environment_id)?))
}

pub(crate) fn create_request(device_id: &str, record: &CreateEnvironmentRecord) -> Result<ApiRequest> {
    ApiRequest::post(environments_path(device_id)?).json(record)
}

pub(crate) fn delete_request(device_id: &str, environment_id: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::delete(environment_path(device_id, environment_id)?))
}

pub(crate) fn create_entry_request(
    device_id: &str,
    environment_id: &str,
    entry: &CreateEnvironmentEntry,
) -> Result<ApiRequest> {
    ApiRequest::post(environment_path(device_id, environment_id)?).json(entry)
}

pub(crate) fn delete_entry_request(
    device_id: &str,
    environment_id: &str,
    timestamp: DateTime<Utc>,
) -> Result<ApiRequest> {
    let path = format!("{}/entries", environment_path(device_id, environment_id)?);
    ApiRequest::delete(path).json(&TimestampBody { timestamp })
}

/// Environment record operations
pub struct Environments<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> Environments<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    /// List the environment records of a device
    #[instrument(skip(self))]
    pub async fn list(&self, device_id: &str) -> Result<Vec<EnvironmentRecord>> {
        let request = list_request(device_id)?;
        self.client.send(request).await?.json()
    }

    /// Get one environment record with its entries
    #[instrument(skip(self))]
    pub async fn get(&self, device_id: &str, environment_id: &str) -> Result<EnvironmentRecord> {
        let request = get_request(device_id, environment_id)?;
        self.client.send(request).await?.json()
    }

    /// Create an environment record
    #[instrument(skip(self, record), fields(title = record.title()))]
    pub async fn create(
        &self,
        device_id: &str,
        record: &CreateEnvironmentRecord,
    ) -> Result<EnvironmentRecord> {
        let request = create_request(device_id, record)?;
        let created: EnvironmentRecord = self.client.send(request).await?.json()?;
        tracing::info!(device_id, environment_id = %created.id, "Created environment record");
        Ok(created)
    }

    /// Delete an environment record and all of its entries
    #[instrument(skip(self))]
    pub async fn delete(&self, device_id: &str, environment_id: &str) -> Result<()> {
        let request = delete_request(device_id, environment_id)?;
        self.client.send(request).await?;
        tracing::info!(device_id, environment_id, "Deleted environment record");
        Ok(())
    }

    /// Add a measurement to an environment record
    #[instrument(skip(self, entry), fields(value = %entry.value()))]
    pub async fn create_entry(
        &self,
        device_id: &str,
        environment_id: &str,
        entry: &CreateEnvironmentEntry,
    ) -> Result<()> {
        let request = create_entry_request(device_id, environment_id, entry)?;
        self.client.send(request).await?;
        Ok(())
    }

    /// Delete the measurement taken at `timestamp`
    #[instrument(skip(self))]
    pub async fn delete_entry(
        &self,
        device_id: &str,
        environment_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let request = delete_entry_request(device_id, environment_id, timestamp)?;
        self.client.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use reqwest::{Method, StatusCode};
    use rstest::rstest;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{ApiErrorKind, Error};
    use crate::testing::SpyTransport;

    fn client_with(spy: &Arc<SpyTransport>) -> EnergyTrackerClient {
        EnergyTrackerClient::with_transport(ClientConfig::new("test-token"), spy.clone())
    }

    #[rstest]
    #[case(list_request("dev-1").unwrap(), Method::GET, "/v1/devices/standard/dev-1/environments")]
    #[case(get_request("dev-1", "env-1").unwrap(), Method::GET, "/v1/devices/standard/dev-1/environments/env-1")]
    #[case(delete_request("dev-1", "env-1").unwrap(), Method::DELETE, "/v1/devices/standard/dev-1/environments/env-1")]
    fn test_request_paths(#[case] request: ApiRequest, #[case] method: Method, #[case] path: &str) {
        assert_eq!(request.method, method);
        assert_eq!(request.path, path);
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_create_entry_request() {
        let entry = CreateEnvironmentEntry::new(Decimal::new(215, 1));
        let request = create_entry_request("dev-1", "env-1", &entry).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/v1/devices/standard/dev-1/environments/env-1");
        assert_eq!(request.body, Some(serde_json::json!({"value": 21.5})));
    }

    #[test]
    fn test_delete_entry_request() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let request = delete_entry_request("dev-1", "env-1", ts).unwrap();

        assert_eq!(request.method, Method::DELETE);
        assert_eq!(
            request.path,
            "/v1/devices/standard/dev-1/environments/env-1/entries"
        );
        assert_eq!(
            request.body,
            Some(serde_json::json!({"timestamp": "2024-03-01T08:00:00.000Z"}))
        );
    }

    #[test]
    fn test_invalid_environment_id() {
        let err = get_request("dev-1", "env 1").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("environment_id"));
    }

    #[tokio::test]
    async fn test_get_record() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::OK,
            serde_json::json!({
                "id": "env-1",
                "title": "Temperature",
                "unit": "°C",
                "entries": [{"timestamp": "2024-01-15T10:30:00.000Z", "value": 4.5}]
            }),
        ));
        let client = client_with(&spy);

        let record = client.environments().get("dev-1", "env-1").await.unwrap();
        assert_eq!(record.title, "Temperature");
        assert_eq!(record.entries[0].value, Decimal::new(45, 1));
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::CONFLICT,
            serde_json::json!({"message": "Environment record already exists"}),
        ));
        let client = client_with(&spy);

        let record = CreateEnvironmentRecord::new("Temperature").unwrap();
        let err = client
            .environments()
            .create("dev-1", &record)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(&ApiErrorKind::Conflict));
        assert_eq!(err.api_message(), ["Environment record already exists".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_entry_not_found() {
        let spy = Arc::new(
            SpyTransport::new().with_json(StatusCode::NOT_FOUND, serde_json::json!({})),
        );
        let client = client_with(&spy);

        let err = client
            .environments()
            .delete_entry("dev-1", "env-1", Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "Not Found");
    }

    #[tokio::test]
    async fn test_empty_environment_id_makes_no_call() {
        let spy = Arc::new(SpyTransport::new());
        let client = client_with(&spy);

        let result = client.environments().delete("dev-1", "").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(spy.calls(), 0);
    }
}

//! Meter readings of standard devices

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::client::EnergyTrackerClient;
use crate::error::Result;
use crate::models::{
    CreateMeterReading, ExportMeterReadings, MeterReading, MeterReadingQuery, TimestampBody,
};
use crate::request::{validate_id, ApiRequest};

fn readings_path(device_id: &str) -> Result<String> {
    let device_id = validate_id("device_id", device_id)?;
    Ok(format!("/v3/devices/standard/{}/meter-readings", device_id))
}

pub(crate) fn list_request(device_id: &str, query: &MeterReadingQuery) -> Result<ApiRequest> {
    Ok(query.apply(ApiRequest::get(readings_path(device_id)?)))
}

pub(crate) fn create_request(
    device_id: &str,
    reading: &CreateMeterReading,
    allow_rounding: Option<bool>,
) -> Result<ApiRequest> {
    ApiRequest::post(readings_path(device_id)?)
        .query_opt("allowRounding", allow_rounding.map(|allow| allow.to_string()))
        .json(reading)
}

pub(crate) fn delete_request(device_id: &str, timestamp: DateTime<Utc>) -> Result<ApiRequest> {
    ApiRequest::delete(readings_path(device_id)?).json(&TimestampBody { timestamp })
}

pub(crate) fn export_request(
    device_id: &str,
    export: &ExportMeterReadings,
    query: &MeterReadingQuery,
) -> Result<ApiRequest> {
    let path = format!("{}/export", readings_path(device_id)?);
    query.apply(ApiRequest::post(path)).json(export)
}

/// Meter reading operations
pub struct MeterReadings<'a> {
    client: &'a EnergyTrackerClient,
}

impl<'a> MeterReadings<'a> {
    pub(crate) fn new(client: &'a EnergyTrackerClient) -> Self {
        Self { client }
    }

    /// List readings of a device, newest first unless the query says otherwise
    #[instrument(skip(self))]
    pub async fn list(&self, device_id: &str, query: &MeterReadingQuery) -> Result<Vec<MeterReading>> {
        let request = list_request(device_id, query)?;
        self.client.send(request).await?.json()
    }

    /// Submit a new reading and return the record stored by the server
    ///
    /// `allow_rounding` lets the server round the value to the meter's
    /// precision; it is only sent when set.
    #[instrument(skip(self, reading), fields(value = %reading.value()))]
    pub async fn create(
        &self,
        device_id: &str,
        reading: &CreateMeterReading,
        allow_rounding: Option<bool>,
    ) -> Result<MeterReading> {
        let request = create_request(device_id, reading, allow_rounding)?;
        let created: MeterReading = self.client.send(request).await?.json()?;
        tracing::info!(device_id, timestamp = %created.timestamp, "Created meter reading");
        Ok(created)
    }

    /// Delete the reading taken at `timestamp`
    #[instrument(skip(self))]
    pub async fn delete(&self, device_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let request = delete_request(device_id, timestamp)?;
        self.client.send(request).await?;
        tracing::info!(device_id, %timestamp, "Deleted meter reading");
        Ok(())
    }

    /// Export readings as CSV, returned as raw bytes
    #[instrument(skip(self, export))]
    pub async fn export(
        &self,
        device_id: &str,
        export: &ExportMeterReadings,
        query: &MeterReadingQuery,
    ) -> Result<Bytes> {
        let request = export_request(device_id, export, query)?;
        Ok(self.client.send(request).await?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use reqwest::{Method, StatusCode};
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{ApiErrorKind, Error};
    use crate::models::{ExportColumn, SortDirection};
    use crate::request::ApiResponse;
    use crate::testing::SpyTransport;

    fn client_with(spy: &Arc<SpyTransport>) -> EnergyTrackerClient {
        EnergyTrackerClient::with_transport(ClientConfig::new("test-token"), spy.clone())
    }

    fn reading_json() -> serde_json::Value {
        serde_json::json!({
            "timestamp": "2024-01-15T10:30:00.000Z",
            "value": "12345.67",
            "rolloverOffset": "0",
            "meterId": "meter-1"
        })
    }

    #[test]
    fn test_create_request_without_rounding_flag() {
        let reading = CreateMeterReading::new(Decimal::from(5)).unwrap();
        let request = create_request("dev-1", &reading, None).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/v3/devices/standard/dev-1/meter-readings");
        assert!(request.query.is_empty());
        assert_eq!(request.body, Some(serde_json::json!({"value": "5"})));
    }

    #[test]
    fn test_create_request_with_rounding_flag() {
        let reading = CreateMeterReading::new(Decimal::from(5)).unwrap();

        let request = create_request("dev-1", &reading, Some(true)).unwrap();
        assert_eq!(
            request.query.get("allowRounding").map(String::as_str),
            Some("true")
        );

        let request = create_request("dev-1", &reading, Some(false)).unwrap();
        assert_eq!(
            request.query.get("allowRounding").map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn test_delete_request_body() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let request = delete_request("dev-1", ts).unwrap();

        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/v3/devices/standard/dev-1/meter-readings");
        assert_eq!(
            request.body,
            Some(serde_json::json!({"timestamp": "2024-01-15T10:30:00.000Z"}))
        );
    }

    #[test]
    fn test_export_request() {
        let export = ExportMeterReadings::new(vec![ExportColumn::Date, ExportColumn::Value]).unwrap();
        let query = MeterReadingQuery::default()
            .meter_id("meter-abc")
            .sort(SortDirection::Asc);
        let request = export_request("dev-1", &export, &query).unwrap();

        assert_eq!(request.path, "/v3/devices/standard/dev-1/meter-readings/export");
        assert_eq!(request.query.len(), 2);
        assert_eq!(
            request.body,
            Some(serde_json::json!({
                "columns": ["date", "value"],
                "includeHeader": true,
                "delimiter": "comma",
                "dateFormat": "iso"
            }))
        );
    }

    #[test]
    fn test_invalid_device_id() {
        let query = MeterReadingQuery::default();
        for device_id in ["", "a b", "a/b", "a?b", "a#b", "50%"] {
            let err = list_request(device_id, &query).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{device_id:?}");
        }
    }

    #[tokio::test]
    async fn test_create_returns_record() {
        let spy = Arc::new(SpyTransport::new().with_json(StatusCode::CREATED, reading_json()));
        let client = client_with(&spy);

        let reading = CreateMeterReading::new(Decimal::from_str("12345.67").unwrap()).unwrap();
        let created = client
            .meter_readings()
            .create("dev-1", &reading, None)
            .await
            .unwrap();

        assert_eq!(created.value, Decimal::from_str("12345.67").unwrap());
        assert_eq!(created.meter_id, "meter-1");
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_error() {
        let spy = Arc::new(SpyTransport::new().with_json(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"message": ["value must be a number", "timestamp invalid"]}),
        ));
        let client = client_with(&spy);

        let reading = CreateMeterReading::new(Decimal::ONE).unwrap();
        let err = client
            .meter_readings()
            .create("dev-1", &reading, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(&ApiErrorKind::Validation));
        assert_eq!(
            err.to_string(),
            "Bad Request (value must be a number; timestamp invalid)"
        );
    }

    #[tokio::test]
    async fn test_delete_empty_device_makes_no_call() {
        let spy = Arc::new(SpyTransport::new());
        let client = client_with(&spy);

        let err = client
            .meter_readings()
            .delete("", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_response() {
        let spy = Arc::new(SpyTransport::new().with_response(ApiResponse::new(
            StatusCode::NO_CONTENT,
            Default::default(),
            Bytes::new(),
        )));
        let client = client_with(&spy);

        client
            .meter_readings()
            .delete("dev-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(spy.last_request().unwrap().method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_export_returns_raw_bytes() {
        let csv = "date,value\n2024-01-15,123.45\n";
        let spy = Arc::new(SpyTransport::new().with_response(ApiResponse::new(
            StatusCode::OK,
            Default::default(),
            csv,
        )));
        let client = client_with(&spy);

        let export = ExportMeterReadings::new(vec![ExportColumn::Date, ExportColumn::Value]).unwrap();
        let bytes = client
            .meter_readings()
            .export("dev-1", &export, &MeterReadingQuery::default())
            .await
            .unwrap();

        assert_eq!(&bytes[..], csv.as_bytes());
    }
}

//! Device types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format_timestamp;
use crate::request::ApiRequest;

/// Summary of a measuring device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    /// Logical path used to group devices into folders
    pub folder_path: String,
    /// `None` if the device was never updated
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Filters for device listings
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    /// Filter by (partial) device name
    pub name: Option<String>,
    pub folder_path: Option<String>,
    /// Only devices updated at or after this time
    pub updated_after: Option<DateTime<Utc>>,
    /// Only devices updated at or before this time
    pub updated_before: Option<DateTime<Utc>>,
}

impl DeviceFilter {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn folder_path(mut self, path: impl Into<String>) -> Self {
        self.folder_path = Some(path.into());
        self
    }

    pub fn updated_after(mut self, timestamp: DateTime<Utc>) -> Self {
        self.updated_after = Some(timestamp);
        self
    }

    pub fn updated_before(mut self, timestamp: DateTime<Utc>) -> Self {
        self.updated_before = Some(timestamp);
        self
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("name", self.name.clone())
            .query_opt("folderPath", self.folder_path.clone())
            .query_opt("updatedAfter", self.updated_after.as_ref().map(format_timestamp))
            .query_opt(
                "updatedBefore",
                self.updated_before.as_ref().map(format_timestamp),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_device_summary_from_json() {
        let device: DeviceSummary = serde_json::from_value(serde_json::json!({
            "id": "dev-1",
            "name": "Electricity",
            "folderPath": "/house/basement",
            "lastUpdatedAt": "2024-01-15T10:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(device.id, "dev-1");
        assert_eq!(device.folder_path, "/house/basement");
        assert_eq!(
            device.last_updated_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_device_summary_never_updated() {
        let device: DeviceSummary = serde_json::from_value(serde_json::json!({
            "id": "dev-2",
            "name": "Water",
            "folderPath": "",
            "lastUpdatedAt": null
        }))
        .unwrap();
        assert_eq!(device.last_updated_at, None);
    }

    #[test]
    fn test_empty_filter_adds_no_query() {
        let request = DeviceFilter::default().apply(ApiRequest::get("/v1/devices/standard"));
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_filter_query_params() {
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let request = DeviceFilter::default()
            .name("meter")
            .folder_path("/garage")
            .updated_after(after)
            .apply(ApiRequest::get("/v1/devices/standard"));

        assert_eq!(request.query.get("name").map(String::as_str), Some("meter"));
        assert_eq!(
            request.query.get("folderPath").map(String::as_str),
            Some("/garage")
        );
        assert_eq!(
            request.query.get("updatedAfter").map(String::as_str),
            Some("2024-01-01T00:00:00.000Z")
        );
        assert!(!request.query.contains_key("updatedBefore"));
    }
}

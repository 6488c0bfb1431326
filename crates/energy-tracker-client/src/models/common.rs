//! Shared serialization helpers

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Format a timestamp as ISO 8601 UTC with millisecond precision
///
/// This is the format the API expects in bodies and query strings,
/// e.g. `2024-01-15T10:30:00.000Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

pub(crate) fn serialize_optional_timestamp<S: Serializer>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => serialize_timestamp(timestamp, serializer),
        None => serializer.serialize_none(),
    }
}

/// Body identifying a reading or entry by its timestamp (used for deletes)
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TimestampBody {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

//! Meter reading types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::serialize_optional_timestamp;
use super::format_timestamp;
use crate::error::{Error, Result};
use crate::request::ApiRequest;

/// Sort direction for query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// CSV delimiter for exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvDelimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

/// Date format for exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    #[default]
    Iso,
    DateTime,
    Unix,
    UnixMs,
}

/// Columns available in a CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportColumn {
    Date,
    Value,
    Note,
    MeterId,
    MeterNumber,
}

impl ExportColumn {
    pub const ALL: [ExportColumn; 5] = [
        Self::Date,
        Self::Value,
        Self::Note,
        Self::MeterId,
        Self::MeterNumber,
    ];
}

/// A meter reading returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub timestamp: DateTime<Utc>,
    /// Recorded value, decimal precision preserved
    pub value: Decimal,
    /// Rollover offset applied to the value
    #[serde(default)]
    pub rollover_offset: Decimal,
    pub meter_id: String,
    #[serde(default)]
    pub note: Option<String>,
    /// External meter number
    #[serde(default)]
    pub meter_number: Option<String>,
}

/// New meter reading for a device
///
/// The value is checked when the reading is constructed; absent optional
/// fields are left out of the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMeterReading {
    value: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl CreateMeterReading {
    /// Create a reading; negative values are rejected
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::invalid_input(format!(
                "meter reading value must not be negative, got {}",
                value
            )));
        }
        Ok(Self {
            value,
            timestamp: None,
            note: None,
        })
    }

    /// Time the reading was taken (the server uses the current time if unset)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Filters and ordering for listing or exporting readings
#[derive(Debug, Clone, Default)]
pub struct MeterReadingQuery {
    pub meter_id: Option<String>,
    /// Only readings at or after this time
    pub from: Option<DateTime<Utc>>,
    /// Only readings at or before this time
    pub to: Option<DateTime<Utc>>,
    /// Sort by timestamp (default: descending)
    pub sort: SortDirection,
}

impl MeterReadingQuery {
    pub fn meter_id(mut self, meter_id: impl Into<String>) -> Self {
        self.meter_id = Some(meter_id.into());
        self
    }

    pub fn from_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.from = Some(timestamp);
        self
    }

    pub fn to_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.to = Some(timestamp);
        self
    }

    pub fn sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = request
            .query_opt("meterId", self.meter_id.clone())
            .query_opt("from", self.from.as_ref().map(format_timestamp))
            .query_opt("to", self.to.as_ref().map(format_timestamp));

        // Descending is the server default and is not sent
        match self.sort {
            SortDirection::Desc => request,
            sort => request.query("sort", sort.as_str()),
        }
    }
}

/// CSV export settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeterReadings {
    /// Columns in output order
    pub columns: Vec<ExportColumn>,
    pub include_header: bool,
    pub delimiter: CsvDelimiter,
    pub date_format: DateFormat,
}

impl ExportMeterReadings {
    /// Export the given columns with a header row, comma-separated, ISO dates
    pub fn new(columns: Vec<ExportColumn>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::invalid_input(
                "export requires at least one column",
            ));
        }
        Ok(Self {
            columns,
            include_header: true,
            delimiter: CsvDelimiter::default(),
            date_format: DateFormat::default(),
        })
    }

    pub fn include_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    pub fn delimiter(mut self, delimiter: CsvDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn date_format(mut self, format: DateFormat) -> Self {
        self.date_format = format;
        self
    }
}

//! Environment record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::serialize_optional_timestamp;
use crate::error::{Error, Result};

/// A single environment measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

/// An environment record (e.g. outdoor temperature) with its entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub entries: Vec<EnvironmentEntry>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// New environment record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEnvironmentRecord {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
}

impl CreateEnvironmentRecord {
    /// Create a record with the given title (e.g. "Temperature")
    pub fn new(title: impl Into<String>) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::invalid_input(
                "environment title must not be empty",
            ));
        }
        Ok(Self { title, unit: None })
    }

    /// Unit of measurement (e.g. "°C")
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

/// New measurement for an environment record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEnvironmentEntry {
    /// Sent as a JSON number, unlike meter reading values
    #[serde(with = "rust_decimal::serde::float")]
    value: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    timestamp: Option<DateTime<Utc>>,
}

impl CreateEnvironmentEntry {
    pub fn new(value: Decimal) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }

    /// Time of the measurement (the server uses the current time if unset)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

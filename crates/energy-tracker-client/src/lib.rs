//! Energy Tracker Client Library
//!
//! Provides a typed HTTP client for the Energy Tracker public REST API:
//! measuring devices, meter readings and environment records.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::str::FromStr;
//!
//! use energy_tracker_client::{CreateMeterReading, EnergyTrackerClient, MeterReadingQuery};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EnergyTrackerClient::new("your-personal-access-token")?;
//!
//!     // List measuring devices
//!     let devices = client.devices().list_standard().await?;
//!
//!     // Submit a reading with exact decimal precision
//!     let reading = CreateMeterReading::new(Decimal::from_str("12345.67")?)?
//!         .with_note("Monthly reading");
//!     let created = client
//!         .meter_readings()
//!         .create(&devices[0].id, &reading, None)
//!         .await?;
//!
//!     // Read them back, newest first
//!     let readings = client
//!         .meter_readings()
//!         .list(&devices[0].id, &MeterReadingQuery::default())
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every failed call returns an [`Error`]. Server error responses become
//! [`Error::Api`] with an [`ApiErrorKind`] derived from the status code and
//! the server's messages in `api_message`; rate limiting carries the
//! `Retry-After` delay:
//!
//! ```rust,ignore
//! match client.devices().list_standard().await {
//!     Ok(devices) => { /* ... */ }
//!     Err(e) => match e.retry_after() {
//!         Some(delay) => sleep(delay).await,
//!         None => eprintln!("{}: {:?}", e, e.api_message()),
//!     },
//! }
//! ```
//!
//! # Blocking
//!
//! [`blocking::EnergyTrackerClient`] offers the same operations without an
//! async runtime.
//!
//! # Testing
//!
//! The `testing` module provides a mock server and a transport spy:
//!
//! ```rust,ignore
//! use energy_tracker_client::testing::MockServer;
//!
//! let server = MockServer::start(router)?;
//! let client = EnergyTrackerClient::with_config(server.config())?;
//! ```

pub mod blocking;
mod classify;
mod client;
mod config;
mod error;
mod models;
mod request;
pub mod resources;
pub mod testing;
pub mod transport;

pub use classify::{classify, extract_api_message};
pub use client::EnergyTrackerClient;
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, TransportSettings, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use models::*;
pub use request::{validate_id, ApiRequest, ApiResponse};
pub use resources::DeviceKind;

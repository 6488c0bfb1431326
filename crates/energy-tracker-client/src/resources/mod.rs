//! Resource façades for the async client
//!
//! Each module pairs pure request builders, shared with the blocking
//! client, with an async façade borrowed from [`EnergyTrackerClient`].
//! Identifiers are validated while building the request, so malformed
//! input never reaches the transport.
//!
//! [`EnergyTrackerClient`]: crate::EnergyTrackerClient

pub mod devices;
pub mod environments;
pub mod meter_readings;

pub use devices::{DeviceKind, Devices};
pub use environments::Environments;
pub use meter_readings::MeterReadings;

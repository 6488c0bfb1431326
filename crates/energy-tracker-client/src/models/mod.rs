//! Request and response types for the Energy Tracker API

mod common;
mod devices;
mod environments;
mod meter_readings;

pub use common::format_timestamp;
pub(crate) use common::TimestampBody;
pub use devices::*;
pub use environments::*;
pub use meter_readings::*;

//! Blocking Energy Tracker client
//!
//! Same operations as the async client, executed on the calling thread
//! over `reqwest::blocking`. Do not use it from inside an async runtime;
//! use [`crate::EnergyTrackerClient`] there instead.
//!
//! ```rust,no_run
//! use energy_tracker_client::blocking::EnergyTrackerClient;
//!
//! let client = EnergyTrackerClient::new("your-token")?;
//! for device in client.devices().list_standard()? {
//!     println!("{} {}", device.id, device.name);
//! }
//! # Ok::<(), energy_tracker_client::Error>(())
//! ```

mod client;
mod resources;

pub use client::EnergyTrackerClient;
pub use resources::{Devices, Environments, MeterReadings};

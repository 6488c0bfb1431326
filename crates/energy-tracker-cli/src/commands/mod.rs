//! Command implementations for energy-tracker

pub mod devices;
pub mod environments;
pub mod readings;

pub use devices::devices;
pub use environments::{
    add_entry, create_environment, delete_entry, delete_environment, list_environments,
    show_environment,
};
pub use readings::{add_reading, delete_reading, export_readings, list_readings};

//! Energy Tracker CLI - Command-line tool for the Energy Tracker API
//!
//! Lists devices, records and exports meter readings, and manages
//! environment records from the terminal.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use energy_tracker_client::{
    CreateEnvironmentEntry, CreateEnvironmentRecord, CreateMeterReading, CsvDelimiter, DateFormat,
    DeviceFilter, DeviceKind, EnergyTrackerClient, ExportColumn, ExportMeterReadings,
    MeterReadingQuery, SortDirection,
};
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, MergedConfig, Overrides};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "energy-tracker")]
#[command(author, version, about = "Energy Tracker API CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Personal access token
    #[arg(long, env = "ENERGY_TRACKER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL
    #[arg(long, env = "ENERGY_TRACKER_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(short, long, env = "ENERGY_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List measuring devices
    Devices {
        /// List virtual instead of standard devices
        #[arg(long = "virtual")]
        virtual_devices: bool,

        /// Filter by device name
        #[arg(long)]
        name: Option<String>,

        /// Filter by folder path
        #[arg(long)]
        folder: Option<String>,

        /// Only devices updated at or after this time (RFC 3339)
        #[arg(long)]
        updated_after: Option<DateTime<Utc>>,

        /// Only devices updated at or before this time (RFC 3339)
        #[arg(long)]
        updated_before: Option<DateTime<Utc>>,
    },

    /// Manage meter readings
    #[command(subcommand)]
    Readings(ReadingsCommand),

    /// Manage environment records
    #[command(subcommand)]
    #[command(alias = "env")]
    Environments(EnvironmentsCommand),
}

#[derive(Subcommand)]
enum ReadingsCommand {
    /// List readings of a device
    List {
        /// Device ID
        device: String,

        #[command(flatten)]
        filter: ReadingFilterArgs,
    },

    /// Record a new reading
    Add {
        /// Device ID
        device: String,

        /// Meter value, e.g. 12345.67
        value: Decimal,

        /// Time of the reading (RFC 3339, default: now on the server)
        #[arg(long)]
        timestamp: Option<DateTime<Utc>>,

        /// Note attached to the reading
        #[arg(long)]
        note: Option<String>,

        /// Allow or forbid rounding to the meter's precision
        #[arg(long)]
        allow_rounding: Option<bool>,
    },

    /// Delete the reading taken at a timestamp
    Delete {
        /// Device ID
        device: String,

        /// Timestamp of the reading (RFC 3339)
        timestamp: DateTime<Utc>,
    },

    /// Export readings as CSV
    Export {
        /// Device ID
        device: String,

        /// Columns to export, in order
        #[arg(long, value_enum, value_delimiter = ',', default_value = "date,value")]
        columns: Vec<ColumnArg>,

        /// Field delimiter
        #[arg(long, value_enum, default_value = "comma")]
        delimiter: DelimiterArg,

        /// Date format
        #[arg(long, value_enum, default_value = "iso")]
        date_format: DateFormatArg,

        /// Omit the header row
        #[arg(long)]
        no_header: bool,

        /// Write to a file instead of stdout
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        filter: ReadingFilterArgs,
    },
}

#[derive(Args)]
struct ReadingFilterArgs {
    /// Only readings of this meter
    #[arg(long)]
    meter_id: Option<String>,

    /// Only readings at or after this time (RFC 3339)
    #[arg(long)]
    from: Option<DateTime<Utc>>,

    /// Only readings at or before this time (RFC 3339)
    #[arg(long)]
    to: Option<DateTime<Utc>>,

    /// Oldest first
    #[arg(long)]
    asc: bool,
}

impl ReadingFilterArgs {
    fn query(&self) -> MeterReadingQuery {
        let mut query = MeterReadingQuery::default();
        if let Some(meter_id) = &self.meter_id {
            query = query.meter_id(meter_id.as_str());
        }
        if let Some(from) = self.from {
            query = query.from_timestamp(from);
        }
        if let Some(to) = self.to {
            query = query.to_timestamp(to);
        }
        if self.asc {
            query = query.sort(SortDirection::Asc);
        }
        query
    }
}

#[derive(Subcommand)]
enum EnvironmentsCommand {
    /// List environment records of a device
    List {
        /// Device ID
        device: String,
    },

    /// Show an environment record with its entries
    Show {
        /// Device ID
        device: String,

        /// Environment record ID
        environment: String,
    },

    /// Create an environment record
    Create {
        /// Device ID
        device: String,

        /// Title, e.g. "Outdoor temperature"
        title: String,

        /// Unit of measurement, e.g. "°C"
        #[arg(long)]
        unit: Option<String>,
    },

    /// Delete an environment record
    Delete {
        /// Device ID
        device: String,

        /// Environment record ID
        environment: String,
    },

    /// Add a measurement to an environment record
    AddEntry {
        /// Device ID
        device: String,

        /// Environment record ID
        environment: String,

        /// Measured value
        #[arg(allow_negative_numbers = true)]
        value: Decimal,

        /// Time of the measurement (RFC 3339, default: now on the server)
        #[arg(long)]
        timestamp: Option<DateTime<Utc>>,
    },

    /// Delete the measurement taken at a timestamp
    DeleteEntry {
        /// Device ID
        device: String,

        /// Environment record ID
        environment: String,

        /// Timestamp of the measurement (RFC 3339)
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColumnArg {
    Date,
    Value,
    Note,
    MeterId,
    MeterNumber,
}

impl From<ColumnArg> for ExportColumn {
    fn from(column: ColumnArg) -> Self {
        match column {
            ColumnArg::Date => Self::Date,
            ColumnArg::Value => Self::Value,
            ColumnArg::Note => Self::Note,
            ColumnArg::MeterId => Self::MeterId,
            ColumnArg::MeterNumber => Self::MeterNumber,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Comma,
    Semicolon,
    Tab,
}

impl From<DelimiterArg> for CsvDelimiter {
    fn from(delimiter: DelimiterArg) -> Self {
        match delimiter {
            DelimiterArg::Comma => Self::Comma,
            DelimiterArg::Semicolon => Self::Semicolon,
            DelimiterArg::Tab => Self::Tab,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateFormatArg {
    Iso,
    DateTime,
    Unix,
    UnixMs,
}

impl From<DateFormatArg> for DateFormat {
    fn from(format: DateFormatArg) -> Self {
        match format {
            DateFormatArg::Iso => Self::Iso,
            DateFormatArg::DateTime => Self::DateTime,
            DateFormatArg::Unix => Self::Unix,
            DateFormatArg::UnixMs => Self::UnixMs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let merged = match load_config(&cli) {
        Ok(merged) => merged,
        Err(e) => {
            OutputContext::new(OutputFormat::Table, cli.no_color, cli.quiet)
                .error(&format!("Error: {:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let ctx = OutputContext::new(merged.output, merged.no_color, cli.quiet);

    match run(&cli.command, &merged, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, &ctx);
            ExitCode::FAILURE
        }
    }
}

/// Load the config file and merge CLI args over it
fn load_config(cli: &Cli) -> Result<MergedConfig> {
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    Ok(config.merge_with_args(Overrides {
        token: cli.token.as_deref(),
        base_url: cli.base_url.as_deref(),
        timeout_secs: cli.timeout,
        output: cli.output,
        no_color: cli.no_color,
    }))
}

async fn run(command: &Commands, merged: &MergedConfig, ctx: &OutputContext) -> Result<()> {
    let client = create_client(merged)?;

    match command {
        Commands::Devices {
            virtual_devices,
            name,
            folder,
            updated_after,
            updated_before,
        } => {
            let mut filter = DeviceFilter::default();
            if let Some(name) = name {
                filter = filter.name(name.as_str());
            }
            if let Some(folder) = folder {
                filter = filter.folder_path(folder.as_str());
            }
            if let Some(after) = updated_after {
                filter = filter.updated_after(*after);
            }
            if let Some(before) = updated_before {
                filter = filter.updated_before(*before);
            }
            let kind = if *virtual_devices {
                DeviceKind::Virtual
            } else {
                DeviceKind::Standard
            };
            commands::devices(&client, kind, &filter, ctx).await?;
        }

        Commands::Readings(ReadingsCommand::List { device, filter }) => {
            commands::list_readings(&client, device, &filter.query(), ctx).await?;
        }

        Commands::Readings(ReadingsCommand::Add {
            device,
            value,
            timestamp,
            note,
            allow_rounding,
        }) => {
            let mut reading = CreateMeterReading::new(*value)?;
            if let Some(timestamp) = timestamp {
                reading = reading.with_timestamp(*timestamp);
            }
            if let Some(note) = note {
                reading = reading.with_note(note.as_str());
            }
            commands::add_reading(&client, device, &reading, *allow_rounding, ctx).await?;
        }

        Commands::Readings(ReadingsCommand::Delete { device, timestamp }) => {
            commands::delete_reading(&client, device, *timestamp, ctx).await?;
        }

        Commands::Readings(ReadingsCommand::Export {
            device,
            columns,
            delimiter,
            date_format,
            no_header,
            file,
            filter,
        }) => {
            let export = ExportMeterReadings::new(columns.iter().map(|&c| c.into()).collect())?
                .include_header(!no_header)
                .delimiter((*delimiter).into())
                .date_format((*date_format).into());
            commands::export_readings(
                &client,
                device,
                &export,
                &filter.query(),
                file.as_deref(),
                ctx,
            )
            .await?;
        }

        Commands::Environments(EnvironmentsCommand::List { device }) => {
            commands::list_environments(&client, device, ctx).await?;
        }

        Commands::Environments(EnvironmentsCommand::Show {
            device,
            environment,
        }) => {
            commands::show_environment(&client, device, environment, ctx).await?;
        }

        Commands::Environments(EnvironmentsCommand::Create {
            device,
            title,
            unit,
        }) => {
            let mut record = CreateEnvironmentRecord::new(title.as_str())?;
            if let Some(unit) = unit {
                record = record.with_unit(unit.as_str());
            }
            commands::create_environment(&client, device, &record, ctx).await?;
        }

        Commands::Environments(EnvironmentsCommand::Delete {
            device,
            environment,
        }) => {
            commands::delete_environment(&client, device, environment, ctx).await?;
        }

        Commands::Environments(EnvironmentsCommand::AddEntry {
            device,
            environment,
            value,
            timestamp,
        }) => {
            let mut entry = CreateEnvironmentEntry::new(*value);
            if let Some(timestamp) = timestamp {
                entry = entry.with_timestamp(*timestamp);
            }
            commands::add_entry(&client, device, environment, &entry, ctx).await?;
        }

        Commands::Environments(EnvironmentsCommand::DeleteEntry {
            device,
            environment,
            timestamp,
        }) => {
            commands::delete_entry(&client, device, environment, *timestamp, ctx).await?;
        }
    }

    Ok(())
}

/// Create an Energy Tracker client from the merged configuration
fn create_client(merged: &MergedConfig) -> Result<EnergyTrackerClient> {
    let config = merged.client_config()?;
    EnergyTrackerClient::with_config(config).context("Failed to create Energy Tracker client")
}

/// Print an error with any messages returned by the API
fn report(err: &anyhow::Error, ctx: &OutputContext) {
    ctx.error(&format!("Error: {:#}", err));

    if let Some(api_err) = err.downcast_ref::<energy_tracker_client::Error>() {
        // Validation errors already include the messages in their text
        if api_err.kind() != Some(&energy_tracker_client::ApiErrorKind::Validation) {
            for message in api_err.api_message() {
                ctx.error(&format!("  {}", message));
            }
        }
    }
}

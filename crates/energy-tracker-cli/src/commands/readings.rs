//! Readings commands - list, add, delete and export meter readings

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use energy_tracker_client::{
    format_timestamp, CreateMeterReading, EnergyTrackerClient, ExportMeterReadings,
    MeterReading, MeterReadingQuery,
};

use crate::output::{OutputContext, ReadingRow};

fn reading_row(reading: MeterReading) -> ReadingRow {
    ReadingRow {
        timestamp: format_timestamp(&reading.timestamp),
        value: reading.value.to_string(),
        rollover_offset: reading.rollover_offset.to_string(),
        meter_id: reading.meter_id,
        note: reading.note.unwrap_or_else(|| "-".to_string()),
    }
}

/// List meter readings of a device
pub async fn list_readings(
    client: &EnergyTrackerClient,
    device_id: &str,
    query: &MeterReadingQuery,
    ctx: &OutputContext,
) -> Result<()> {
    let readings = client.meter_readings().list(device_id, query).await?;

    if readings.is_empty() {
        ctx.info("No readings found");
        return Ok(());
    }

    let rows: Vec<ReadingRow> = readings.into_iter().map(reading_row).collect();
    ctx.print(&rows);
    Ok(())
}

/// Submit a new meter reading
pub async fn add_reading(
    client: &EnergyTrackerClient,
    device_id: &str,
    reading: &CreateMeterReading,
    allow_rounding: Option<bool>,
    ctx: &OutputContext,
) -> Result<()> {
    let created = client
        .meter_readings()
        .create(device_id, reading, allow_rounding)
        .await?;

    ctx.success(&format!(
        "Recorded {} at {}",
        created.value,
        format_timestamp(&created.timestamp)
    ));
    if !ctx.quiet {
        ctx.print(&[reading_row(created)]);
    }
    Ok(())
}

/// Delete the reading taken at a timestamp
pub async fn delete_reading(
    client: &EnergyTrackerClient,
    device_id: &str,
    timestamp: chrono::DateTime<chrono::Utc>,
    ctx: &OutputContext,
) -> Result<()> {
    client.meter_readings().delete(device_id, timestamp).await?;
    ctx.success(&format!("Deleted reading at {}", format_timestamp(&timestamp)));
    Ok(())
}

/// Export readings as CSV to a file or stdout
pub async fn export_readings(
    client: &EnergyTrackerClient,
    device_id: &str,
    export: &ExportMeterReadings,
    query: &MeterReadingQuery,
    file: Option<&Path>,
    ctx: &OutputContext,
) -> Result<()> {
    let csv = client
        .meter_readings()
        .export(device_id, export, query)
        .await?;

    match file {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            ctx.success(&format!("Exported {} bytes to {}", csv.len(), path.display()));
        }
        None => {
            std::io::stdout()
                .write_all(&csv)
                .context("Failed to write export to stdout")?;
        }
    }
    Ok(())
}

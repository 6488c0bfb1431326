//! Environment commands - manage environment records and their entries

use anyhow::Result;
use chrono::{DateTime, Utc};
use energy_tracker_client::{
    format_timestamp, CreateEnvironmentEntry, CreateEnvironmentRecord, EnergyTrackerClient,
};

use crate::output::{EntryRow, EnvironmentRow, OutputContext, OutputFormat};

/// List environment records of a device
pub async fn list_environments(
    client: &EnergyTrackerClient,
    device_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let records = client.environments().list(device_id).await?;

    if records.is_empty() {
        ctx.info("No environment records found");
        return Ok(());
    }

    let rows: Vec<EnvironmentRow> = records
        .into_iter()
        .map(|r| EnvironmentRow {
            id: r.id,
            title: r.title,
            unit: r.unit.unwrap_or_else(|| "-".to_string()),
            entries: r.entries.len(),
        })
        .collect();

    ctx.print(&rows);
    Ok(())
}

/// Show one environment record with its entries
pub async fn show_environment(
    client: &EnergyTrackerClient,
    device_id: &str,
    environment_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let record = client.environments().get(device_id, environment_id).await?;

    let rows: Vec<EntryRow> = record
        .entries
        .iter()
        .map(|e| EntryRow {
            timestamp: format_timestamp(&e.timestamp),
            value: e.value.to_string(),
        })
        .collect();

    // Entries alone for machine-readable formats
    if ctx.format != OutputFormat::Table {
        ctx.print(&rows);
        return Ok(());
    }

    ctx.print_kv(&[
        ("ID", record.id.clone()),
        ("Title", record.title.clone()),
        ("Unit", record.unit.clone().unwrap_or_else(|| "-".to_string())),
        ("Entries", rows.len().to_string()),
    ]);
    if !rows.is_empty() {
        println!();
        ctx.print(&rows);
    }
    Ok(())
}

/// Create an environment record
pub async fn create_environment(
    client: &EnergyTrackerClient,
    device_id: &str,
    record: &CreateEnvironmentRecord,
    ctx: &OutputContext,
) -> Result<()> {
    let created = client.environments().create(device_id, record).await?;
    ctx.success(&format!(
        "Created environment record '{}' ({})",
        created.title, created.id
    ));
    Ok(())
}

/// Delete an environment record
pub async fn delete_environment(
    client: &EnergyTrackerClient,
    device_id: &str,
    environment_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    client
        .environments()
        .delete(device_id, environment_id)
        .await?;
    ctx.success(&format!("Deleted environment record {}", environment_id));
    Ok(())
}

/// Add a measurement to an environment record
pub async fn add_entry(
    client: &EnergyTrackerClient,
    device_id: &str,
    environment_id: &str,
    entry: &CreateEnvironmentEntry,
    ctx: &OutputContext,
) -> Result<()> {
    client
        .environments()
        .create_entry(device_id, environment_id, entry)
        .await?;
    ctx.success(&format!("Added {} to {}", entry.value(), environment_id));
    Ok(())
}

/// Delete the measurement taken at a timestamp
pub async fn delete_entry(
    client: &EnergyTrackerClient,
    device_id: &str,
    environment_id: &str,
    timestamp: DateTime<Utc>,
    ctx: &OutputContext,
) -> Result<()> {
    client
        .environments()
        .delete_entry(device_id, environment_id, timestamp)
        .await?;
    ctx.success(&format!(
        "Deleted entry at {} from {}",
        format_timestamp(&timestamp),
        environment_id
    ));
    Ok(())
}

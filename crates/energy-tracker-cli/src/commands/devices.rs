//! Devices command - list measuring devices

use anyhow::Result;
use energy_tracker_client::{DeviceFilter, DeviceKind, EnergyTrackerClient};

use crate::output::{DeviceRow, OutputContext};

/// List standard or virtual devices
pub async fn devices(
    client: &EnergyTrackerClient,
    kind: DeviceKind,
    filter: &DeviceFilter,
    ctx: &OutputContext,
) -> Result<()> {
    let devices = match kind {
        DeviceKind::Standard => client.devices().list_standard_with(filter).await?,
        DeviceKind::Virtual => client.devices().list_virtual_with(filter).await?,
    };

    let rows: Vec<DeviceRow> = devices
        .into_iter()
        .map(|d| DeviceRow {
            id: d.id,
            name: d.name,
            folder: d.folder_path,
            last_updated: d
                .last_updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    ctx.print(&rows);
    Ok(())
}

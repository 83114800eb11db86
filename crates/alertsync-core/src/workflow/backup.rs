//! Pre-update settings backup

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dashboard::{DashboardClient, Network};
use crate::error::Result;

/// Backup file name for a network, spaces in the name replaced by underscores
pub fn backup_filename(network_name: &str, network_id: &str) -> String {
    format!(
        "{}_{}_alerts_backup.json",
        network_name.replace(' ', "_"),
        network_id
    )
}

/// Snapshot a network's current alert settings into `dir`.
///
/// The settings are written pretty-printed so the backup doubles as a
/// human-readable rollback reference. Callers must treat any error here as
/// "do not update this network": no overwrite without a snapshot.
pub async fn backup_network(
    client: &DashboardClient,
    network: &Network,
    dir: &Path,
) -> Result<PathBuf> {
    let settings = client.alert_settings(&network.id).await?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_filename(&network.name, &network.id));
    std::fs::write(&path, serde_json::to_string_pretty(&settings)?)?;

    debug!(network_id = %network.id, path = %path.display(), "wrote settings backup");
    Ok(path)
}

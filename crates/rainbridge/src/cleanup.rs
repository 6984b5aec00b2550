//! Prefix-filtered purge of destination records.
//!
//! Used to remove bookmarks and lists left behind by test imports. Bookmarks
//! are deleted before lists.

use crate::destination::DestinationMaintenance;
use crate::error::{BridgeError, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Counts from one purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub items_deleted: usize,
    pub items_failed: usize,
    pub folders_deleted: usize,
    pub folders_failed: usize,
}

/// Delete every bookmark whose title and every list whose name starts with
/// `prefix`.
///
/// Listing failures are returned. Individual delete failures are logged,
/// counted, and do not stop the purge. An empty prefix is rejected.
pub async fn purge_matching(
    destination: &dyn DestinationMaintenance,
    prefix: &str,
) -> Result<CleanupSummary> {
    if prefix.is_empty() {
        return Err(BridgeError::Config(
            "cleanup prefix must not be empty".into(),
        ));
    }

    info!("Starting cleanup of records prefixed '{}'", prefix);
    let mut summary = CleanupSummary::default();

    let items = destination.list_items().await?;
    for item in items.iter().filter(|i| i.title.starts_with(prefix)) {
        let Some(id) = item.id() else {
            warn!("Skipping bookmark '{}' without id", item.title);
            summary.items_failed += 1;
            continue;
        };
        match destination.delete_item(id).await {
            Ok(()) => summary.items_deleted += 1,
            Err(e) => {
                warn!("Failed to delete bookmark '{}': {}", item.title, e);
                summary.items_failed += 1;
            }
        }
    }

    let folders = destination.list_folders().await?;
    for folder in folders.iter().filter(|f| f.name.starts_with(prefix)) {
        let Some(id) = folder.id() else {
            warn!("Skipping list '{}' without id", folder.name);
            summary.folders_failed += 1;
            continue;
        };
        match destination.delete_folder(id).await {
            Ok(()) => summary.folders_deleted += 1,
            Err(e) => {
                warn!("Failed to delete list '{}': {}", folder.name, e);
                summary.folders_failed += 1;
            }
        }
    }

    info!(
        "Cleanup complete: {} bookmarks and {} lists deleted ({} failures)",
        summary.items_deleted,
        summary.folders_deleted,
        summary.items_failed + summary.folders_failed
    );
    Ok(summary)
}

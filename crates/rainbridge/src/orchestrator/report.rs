//! Outcome of an import run.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Step of the import a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    CreateFolder,
    FetchItems,
    CreateItem,
    LinkItem,
}

/// A record that could not be migrated, kept for triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub phase: FailurePhase,

    /// Folder or item title.
    pub title: String,

    /// Item URL (None for folder-level failures).
    pub url: Option<String>,

    pub error: String,
}

/// Counters and failures of one import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Unique run identifier.
    pub run_id: String,

    /// Whether destination writes were skipped.
    pub dry_run: bool,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Folders read from the source.
    pub folders_total: usize,

    /// Destination folders created.
    pub folders_created: usize,

    /// Folders whose destination counterpart could not be created.
    pub folders_failed: usize,

    /// Folders whose items could not be read.
    pub item_fetch_failures: usize,

    /// Items read from the source.
    pub items_total: usize,

    /// Destination items created.
    pub items_created: usize,

    /// Items whose creation failed.
    pub items_failed: usize,

    /// Created items attached to their folder.
    pub items_linked: usize,

    /// Created items that could not be attached.
    pub links_failed: usize,

    /// Every per-record failure, in the order it happened.
    pub failures: Vec<FailureRecord>,
}

impl ImportReport {
    pub(crate) fn new(run_id: String, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            dry_run,
            started_at: now,
            completed_at: now,
            duration_seconds: 0.0,
            folders_total: 0,
            folders_created: 0,
            folders_failed: 0,
            item_fetch_failures: 0,
            items_total: 0,
            items_created: 0,
            items_failed: 0,
            items_linked: 0,
            links_failed: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, failure: FailureRecord) {
        self.failures.push(failure);
    }

    pub(crate) fn finish(&mut self) {
        self.completed_at = Utc::now();
        self.duration_seconds =
            (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0;
    }

    /// Number of recorded failures across all phases.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures from one phase.
    pub fn failures_in(&self, phase: FailurePhase) -> impl Iterator<Item = &FailureRecord> {
        self.failures.iter().filter(move |f| f.phase == phase)
    }

    /// Log the counters, then one line per failure.
    pub fn log_summary(&self) {
        info!(
            "Import {}: {}/{} folders, {}/{} items created, {} linked in {:.1}s",
            if self.dry_run { "dry run complete" } else { "complete" },
            self.folders_created,
            self.folders_total,
            self.items_created,
            self.items_total,
            self.items_linked,
            self.duration_seconds
        );

        if self.is_clean() {
            return;
        }

        warn!(
            "{} failures: {} folders, {} item fetches, {} items, {} links",
            self.failure_count(),
            self.folders_failed,
            self.item_fetch_failures,
            self.items_failed,
            self.links_failed
        );
        for failure in &self.failures {
            match &failure.url {
                Some(url) => warn!(
                    "  [{:?}] '{}' <{}>: {}",
                    failure.phase, failure.title, url, failure.error
                ),
                None => warn!("  [{:?}] '{}': {}", failure.phase, failure.title, failure.error),
            }
        }
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

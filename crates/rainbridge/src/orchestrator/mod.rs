//! Import orchestrator - main workflow coordinator.
//!
//! A run walks through these phases:
//!
//! 1. Fetch every source folder. Failure here aborts the run.
//! 2. Create a destination folder for each one, remembering the mapping.
//!    Failures leave the folder unmapped.
//! 3. For each source folder in turn, read its items, create each one on the
//!    destination and attach it to the mapped folder. Per-item failures are
//!    logged and recorded in the [`ImportReport`], never returned.

mod report;

pub use report::{FailurePhase, FailureRecord, ImportReport};

use crate::destination::{BookmarkDestination, DestinationFolder, DestinationItem};
use crate::error::Result;
use crate::source::{BookmarkSource, Folder, FolderId, Item};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Source folder id to destination folder id, for folders created this run.
pub type FolderMapping = HashMap<FolderId, String>;

/// Import orchestrator.
pub struct Orchestrator {
    source: Arc<dyn BookmarkSource>,
    destination: Arc<dyn BookmarkDestination>,
    workers: usize,
    dry_run: bool,
}

/// What happened to one item.
#[derive(Debug, Default)]
struct ItemOutcome {
    created: bool,
    linked: bool,
    failure: Option<FailureRecord>,
}

/// Map a source item onto the destination shape. Values pass through as-is.
pub fn transform_item(item: &Item) -> DestinationItem {
    DestinationItem {
        id: None,
        url: item.link.clone(),
        title: item.title.clone(),
        description: item.excerpt.clone(),
        tags: item.tags.clone(),
    }
}

impl Orchestrator {
    /// Create an orchestrator that processes one item at a time.
    pub fn new(source: Arc<dyn BookmarkSource>, destination: Arc<dyn BookmarkDestination>) -> Self {
        Self {
            source,
            destination,
            workers: 1,
            dry_run: false,
        }
    }

    /// Process up to `workers` items of a folder concurrently.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Only read from the source; make no destination calls.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the import.
    ///
    /// Returns an error only if the source folders cannot be listed. Every
    /// later failure is recorded in the returned report.
    pub async fn run(&self) -> Result<ImportReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = ImportReport::new(run_id, self.dry_run);

        info!("Starting import run: {}", report.run_id);

        // Phase 1: Fetch folders
        info!("Phase 1: Fetching collections from source");
        let folders = match self.source.list_folders().await {
            Ok(folders) => folders,
            Err(e) => {
                error!("Failed to get collections: {}", e);
                return Err(e);
            }
        };
        report.folders_total = folders.len();
        info!("Fetched {} collections", folders.len());

        // Phase 2: Create destination folders
        let mapping = if self.dry_run {
            info!("Phase 2: Skipping list creation (dry run)");
            FolderMapping::new()
        } else {
            info!("Phase 2: Creating lists in destination");
            self.create_folders(&folders, &mut report).await
        };

        // Phase 3: Items, one folder at a time
        info!(
            "Phase 3: Importing bookmarks for {} collections with {} workers",
            folders.len(),
            self.workers
        );
        for folder in &folders {
            let list_id = mapping.get(&folder.id).cloned();
            self.import_folder(folder, list_id, &mut report).await;
        }

        report.finish();
        report.log_summary();
        Ok(report)
    }

    async fn create_folders(&self, folders: &[Folder], report: &mut ImportReport) -> FolderMapping {
        let mut mapping = FolderMapping::new();

        for folder in folders {
            let result = self
                .destination
                .create_folder(&DestinationFolder::named(folder.title.clone()))
                .await;

            match result {
                Ok(created) => match created.id() {
                    Some(id) => {
                        info!("Created list: {}", created.name);
                        mapping.insert(folder.id, id.to_string());
                        report.folders_created += 1;
                    }
                    None => {
                        warn!("Created list '{}' but no id was returned", folder.title);
                        report.folders_failed += 1;
                        report.record(FailureRecord {
                            phase: FailurePhase::CreateFolder,
                            title: folder.title.clone(),
                            url: None,
                            error: "created list has no id".to_string(),
                        });
                    }
                },
                Err(e) => {
                    warn!("Failed to create list '{}': {}", folder.title, e);
                    report.folders_failed += 1;
                    report.record(FailureRecord {
                        phase: FailurePhase::CreateFolder,
                        title: folder.title.clone(),
                        url: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        mapping
    }

    /// Read one folder's items and import them. Returns once every item of
    /// the folder has been created and linked (or has failed).
    async fn import_folder(&self, folder: &Folder, list_id: Option<String>, report: &mut ImportReport) {
        info!("Fetching bookmarks for collection: {}", folder.title);

        let items = match self.source.list_items(folder.id).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to get raindrops for collection '{}': {}", folder.title, e);
                report.item_fetch_failures += 1;
                report.record(FailureRecord {
                    phase: FailurePhase::FetchItems,
                    title: folder.title.clone(),
                    url: None,
                    error: e.to_string(),
                });
                return;
            }
        };

        info!("Found {} bookmarks in '{}'", items.len(), folder.title);
        report.items_total += items.len();

        if self.dry_run {
            for item in &items {
                debug!("Would create bookmark: {} <{}>", item.title, item.link);
            }
            return;
        }

        if list_id.is_none() {
            debug!(
                "Collection '{}' has no destination list, bookmarks will not be linked",
                folder.title
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            let destination = self.destination.clone();
            let list_id = list_id.clone();
            let title = item.title.clone();
            let url = item.link.clone();

            let handle = tokio::spawn(async move {
                let outcome = import_item(destination.as_ref(), &item, list_id.as_deref()).await;
                drop(permit);
                outcome
            });

            handles.push((title, url, handle));
        }

        for (title, url, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Import task for '{}' panicked: {}", title, e);
                    ItemOutcome {
                        failure: Some(FailureRecord {
                            phase: FailurePhase::CreateItem,
                            title,
                            url: Some(url),
                            error: format!("Task panicked: {}", e),
                        }),
                        ..Default::default()
                    }
                }
            };

            if outcome.created {
                report.items_created += 1;
            }
            if outcome.linked {
                report.items_linked += 1;
            }
            if let Some(failure) = outcome.failure {
                match failure.phase {
                    FailurePhase::LinkItem => report.links_failed += 1,
                    _ => report.items_failed += 1,
                }
                report.record(failure);
            }
        }
    }
}

/// Create one item and, when its folder is mapped, link it.
async fn import_item(
    destination: &dyn BookmarkDestination,
    item: &Item,
    list_id: Option<&str>,
) -> ItemOutcome {
    let failure = |phase, error: String| FailureRecord {
        phase,
        title: item.title.clone(),
        url: Some(item.link.clone()),
        error,
    };

    let created = match destination.create_item(&transform_item(item)).await {
        Ok(created) => created,
        Err(e) => {
            warn!("Failed to create bookmark '{}': {}", item.title, e);
            return ItemOutcome {
                failure: Some(failure(FailurePhase::CreateItem, e.to_string())),
                ..Default::default()
            };
        }
    };
    debug!("Created bookmark: {}", item.title);

    let Some(list_id) = list_id else {
        return ItemOutcome {
            created: true,
            ..Default::default()
        };
    };

    let Some(item_id) = created.id() else {
        warn!("Created bookmark '{}' has no id, cannot add it to a list", item.title);
        return ItemOutcome {
            created: true,
            linked: false,
            failure: Some(failure(
                FailurePhase::LinkItem,
                "created bookmark has no id".to_string(),
            )),
        };
    };

    match destination.link_item(item_id, list_id).await {
        Ok(()) => ItemOutcome {
            created: true,
            linked: true,
            failure: None,
        },
        Err(e) => {
            warn!("Failed to add bookmark '{}' to list: {}", item.title, e);
            ItemOutcome {
                created: true,
                linked: false,
                failure: Some(failure(FailurePhase::LinkItem, e.to_string())),
            }
        }
    }
}

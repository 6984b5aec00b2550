//! # rainbridge
//!
//! Migrate bookmarks from Raindrop.io to Karakeep.
//!
//! The library is built around a small resilient HTTP core:
//!
//! - **Retrying executor** that backs off exponentially on HTTP 429
//! - **Paginated reader** that follows zero-indexed pages until an empty one
//! - **Source and destination clients** for the two REST APIs
//! - **Orchestrator** that recreates folders, creates items and links them,
//!   recording per-item failures in an [`ImportReport`] instead of aborting
//!
//! ## Example
//!
//! ```rust,no_run
//! use rainbridge::{Config, Orchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> rainbridge::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let executor = config.executor()?;
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(config.raindrop_client(executor.clone())),
//!         Arc::new(config.karakeep_client(executor)),
//!     );
//!     let report = orchestrator.run().await?;
//!     println!("Imported {} bookmarks", report.items_created);
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod config;
pub(crate) mod de;
pub mod destination;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod pagination;
pub mod source;

// Re-exports for convenient access
pub use cleanup::{purge_matching, CleanupSummary};
pub use config::{Config, DestinationConfig, SourceConfig, TransferConfig};
pub use destination::{
    BookmarkDestination, DestinationFolder, DestinationItem, DestinationMaintenance,
    KarakeepClient,
};
pub use error::{BridgeError, Result};
pub use http::{BackoffPolicy, RequestExecutor};
pub use orchestrator::{FailurePhase, FailureRecord, ImportReport, Orchestrator};
pub use pagination::Paginator;
pub use source::{BookmarkSource, Folder, Item, ItemId, RaindropClient};

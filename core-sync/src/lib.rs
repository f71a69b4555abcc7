//! # Backup Orchestration
//!
//! Uploads local photos that are not yet present in a WebDAV directory.
//!
//! ## Components
//!
//! - **Backup Run State Machine** (`run`): run lifecycle with validated transitions and the summary
//! - **Reconciliation** (`reconcile`): name-based pending set
//! - **Content Reader** (`reader`): local reads with path fallbacks
//! - **Backup Coordinator** (`coordinator`): connectivity, inventory, sequential uploads, cancellation

pub mod coordinator;
pub mod error;
pub mod reader;
pub mod reconcile;
pub mod run;

pub use coordinator::BackupCoordinator;
pub use error::{Result, SyncError};
pub use reader::ContentReader;
pub use reconcile::pending_uploads;
pub use run::{BackupRun, BackupRunId, BackupStatus, BackupSummary};

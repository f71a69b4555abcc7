//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (directory listing,
//! file reads, HTTP, secure storage and an optional media catalog) into the
//! discovery engine and the backup coordinator. Desktop hosts typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`)
//! and let the configuration builder fill in every bridge they don't supply.

pub mod error;
pub mod service;

pub use error::{CoreError, Result};
pub use service::{BackupService, ConnectionReport};

pub use core_auth::ServerCredentials;
pub use core_discovery::{LocalFileRef, ScanOutcome, ScanSource, SourceDirectory};
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::events::{BackupEvent, CoreEvent, DiscoveryEvent};
pub use core_sync::{BackupRun, BackupStatus, BackupSummary};
pub use provider_webdav::{RemoteDirectory, ServerStatus};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};

//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the backup core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, Android, iOS).
//!
//! ## Traits
//!
//! ### Local Storage
//! - [`DirectoryLister`](storage::DirectoryLister) - Raw directory enumeration and stat
//! - [`FileReader`](storage::FileReader) - File content reads and storage root discovery
//! - [`MediaCatalog`](catalog::MediaCatalog) - Optional indexed photo catalog
//!
//! ### Networking & Security
//! - [`HttpClient`](http::HttpClient) - Async HTTP including WebDAV verbs, with retry
//! - [`SecureStore`](storage::SecureStore) - Credential persistence (Keychain/Keystore)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is missing:
//!
//! ```ignore
//! let http_client = builder.http_client
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "HttpClient".to_string(),
//!         message: "No HTTP client implementation provided. \
//!                  Desktop: enable the desktop-shims feature. \
//!                  Mobile: inject platform-native adapter.".to_string()
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! include the path or URL involved in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks.

pub mod catalog;
pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{CatalogEntry, MediaCatalog};
pub use http::{AttemptReport, HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{DirEntry, DirectoryLister, EntryKind, FileMetadata, FileReader, SecureStore};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};

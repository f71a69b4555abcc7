//! # Core Configuration Module
//!
//! Provides configuration management for the photo backup core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all bridges and settings required by discovery and
//! backup. It enforces fail-fast validation so a missing capability is
//! reported before any scan or upload starts.
//!
//! ## Required Dependencies
//!
//! - `DirectoryLister` - Directory enumeration for the walk strategy
//! - `FileReader` - File content reads for uploads
//! - `HttpClient` - WebDAV transport
//! - `SecureStore` - Credential persistence
//!
//! ## Optional Dependencies
//!
//! - `MediaCatalog` - Indexed photo catalog (Android `MediaStore` and friends)
//! - `Clock` - Time source (defaults to the system clock)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults from
//! `bridge-desktop` are injected for every required bridge that is not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .source_directories(["/DCIM/Camera", "/Pictures/Screenshots"])
//!     .target_directory("/Photos/Backup")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! // Without desktop shims and without injected bridges this fails fast
//! // with `Error::CapabilityMissing { capability: "DirectoryLister", .. }`.
//! let err = CoreConfig::builder().build().unwrap_err();
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    Clock, DirectoryLister, FileReader, HttpClient, MediaCatalog, SecureStore, SystemClock,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Source directory scanned when none is configured.
pub const DEFAULT_SOURCE_DIRECTORY: &str = "/DCIM/Camera";

/// Remote directory uploads go to when none is configured.
pub const DEFAULT_TARGET_DIRECTORY: &str = "/Photos/Backup";

/// Core configuration for the photo backup core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory enumeration and stat
    pub directory_lister: Arc<dyn DirectoryLister>,

    /// File content reads
    pub file_reader: Arc<dyn FileReader>,

    /// HTTP transport for WebDAV requests
    pub http_client: Arc<dyn HttpClient>,

    /// Secure credential storage
    pub secure_store: Arc<dyn SecureStore>,

    /// Indexed photo catalog (optional)
    pub media_catalog: Option<Arc<dyn MediaCatalog>>,

    /// Time source for cache expiry
    pub clock: Arc<dyn Clock>,

    /// What to back up and where
    pub backup: BackupSettings,

    /// Local discovery tuning
    pub scan: ScanSettings,

    /// Upload tuning
    pub upload: UploadSettings,

    /// Capacity of the event bus broadcast channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("directory_lister", &"DirectoryLister { ... }")
            .field("file_reader", &"FileReader { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field(
                "media_catalog",
                &self.media_catalog.as_ref().map(|_| "MediaCatalog { ... }"),
            )
            .field("backup", &self.backup)
            .field("scan", &self.scan)
            .field("upload", &self.upload)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// User-facing backup settings.
///
/// Source directories are local paths in the order they should be scanned;
/// the order is part of the scan cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
    pub source_directories: Vec<String>,
    pub target_directory: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            source_directories: vec![DEFAULT_SOURCE_DIRECTORY.to_string()],
            target_directory: DEFAULT_TARGET_DIRECTORY.to_string(),
        }
    }
}

/// Local discovery tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// How long a scan result stays valid for an identical directory list
    pub cache_ttl: Duration,
    /// Maximum nesting below a source root that is still listed
    pub max_depth: usize,
    /// Directory scanned when the caller supplies none
    pub default_source: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            max_depth: 3,
            default_source: DEFAULT_SOURCE_DIRECTORY.to_string(),
        }
    }
}

/// Upload tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Attempts per file, including the first
    pub max_attempts: u32,
    /// Backoff base between attempts
    pub base_delay: Duration,
    /// Per-request timeout for PUT
    pub request_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Source directory entries are not blank
    /// - Cache TTL is non-zero and depth limit is sane
    /// - At least one upload attempt is allowed
    pub fn validate(&self) -> Result<()> {
        if self
            .backup
            .source_directories
            .iter()
            .any(|dir| dir.trim().is_empty())
        {
            return Err(Error::Config(
                "Source directories cannot contain blank entries".to_string(),
            ));
        }

        if self.scan.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Scan cache TTL must be greater than 0".to_string(),
            ));
        }

        if self.scan.max_depth > 16 {
            return Err(Error::Config(
                "Scan depth limit exceeds maximum of 16 levels".to_string(),
            ));
        }

        if self.scan.default_source.trim().is_empty() {
            return Err(Error::Config(
                "Default source directory cannot be empty".to_string(),
            ));
        }

        if self.upload.max_attempts == 0 {
            return Err(Error::Config(
                "Upload attempts must be at least 1".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg_attr(feature = "desktop-shims", allow(dead_code))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: ensure the 'desktop-shims' feature is enabled to use the bridge-desktop default. \
             Mobile: inject the platform-native adapter.",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{KeyringSecureStore, ReqwestHttpClient, TokioFileSystem};

    pub(super) fn file_system() -> Arc<TokioFileSystem> {
        Arc::new(TokioFileSystem::new())
    }

    pub(super) fn http_client() -> Result<Arc<dyn HttpClient>> {
        let client = ReqwestHttpClient::new()?;
        Ok(Arc::new(client))
    }

    pub(super) fn secure_store() -> Arc<dyn SecureStore> {
        Arc::new(KeyringSecureStore::new())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    directory_lister: Option<Arc<dyn DirectoryLister>>,
    file_reader: Option<Arc<dyn FileReader>>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    media_catalog: Option<Arc<dyn MediaCatalog>>,
    clock: Option<Arc<dyn Clock>>,
    backup: BackupSettings,
    scan: ScanSettings,
    upload: UploadSettings,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the directory lister used by the walk strategy.
    pub fn directory_lister(mut self, lister: Arc<dyn DirectoryLister>) -> Self {
        self.directory_lister = Some(lister);
        self
    }

    /// Sets the file reader used for uploads.
    pub fn file_reader(mut self, reader: Arc<dyn FileReader>) -> Self {
        self.file_reader = Some(reader);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the media catalog (optional).
    ///
    /// When absent, discovery always walks directories.
    pub fn media_catalog(mut self, catalog: Arc<dyn MediaCatalog>) -> Self {
        self.media_catalog = Some(catalog);
        self
    }

    /// Sets the time source. Default: [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the local directories to back up, in scan order.
    pub fn source_directories<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backup.source_directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the remote directory uploads go to.
    pub fn target_directory(mut self, dir: impl Into<String>) -> Self {
        self.backup.target_directory = dir.into();
        self
    }

    /// Replaces all backup settings at once.
    pub fn backup_settings(mut self, settings: BackupSettings) -> Self {
        self.backup = settings;
        self
    }

    /// Sets the scan cache TTL. Default: 30 seconds.
    pub fn scan_cache_ttl(mut self, ttl: Duration) -> Self {
        self.scan.cache_ttl = ttl;
        self
    }

    /// Sets the walk depth limit. Default: 3.
    pub fn scan_max_depth(mut self, depth: usize) -> Self {
        self.scan.max_depth = depth;
        self
    }

    /// Sets upload retry attempts per file. Default: 3.
    pub fn upload_max_attempts(mut self, attempts: u32) -> Self {
        self.upload.max_attempts = attempts;
        self
    }

    /// Sets the upload backoff base delay. Default: 500 ms.
    pub fn upload_base_delay(mut self, delay: Duration) -> Self {
        self.upload.base_delay = delay;
        self
    }

    /// Sets the event bus capacity. Default: 256.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if a required bridge is missing and no desktop
    /// default is available, or if a setting is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        #[cfg(feature = "desktop-shims")]
        let (directory_lister, file_reader) = {
            let fs = defaults::file_system();
            let lister: Arc<dyn DirectoryLister> = match self.directory_lister {
                Some(lister) => lister,
                None => fs.clone(),
            };
            let reader: Arc<dyn FileReader> = match self.file_reader {
                Some(reader) => reader,
                None => fs,
            };
            (lister, reader)
        };

        #[cfg(not(feature = "desktop-shims"))]
        let (directory_lister, file_reader) = (
            self.directory_lister.ok_or_else(|| {
                capability_missing("DirectoryLister", "local photo discovery")
            })?,
            self.file_reader
                .ok_or_else(|| capability_missing("FileReader", "reading photos to upload"))?,
        );

        let http_client = match self.http_client {
            Some(client) => client,
            #[cfg(feature = "desktop-shims")]
            None => defaults::http_client()?,
            #[cfg(not(feature = "desktop-shims"))]
            None => return Err(capability_missing("HttpClient", "WebDAV requests")),
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            #[cfg(feature = "desktop-shims")]
            None => defaults::secure_store(),
            #[cfg(not(feature = "desktop-shims"))]
            None => return Err(capability_missing("SecureStore", "credential persistence")),
        };

        let config = CoreConfig {
            directory_lister,
            file_reader,
            http_client,
            secure_store,
            media_catalog: self.media_catalog,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            backup: self.backup,
            scan: self.scan,
            upload: self.upload,
            event_buffer_size: self.event_buffer_size.unwrap_or(256),
        };

        config.validate()?;

        Ok(config)
    }
}

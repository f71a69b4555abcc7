//! # Backup Service
//!
//! Single entry point for hosts: owns the event bus, the status reporter,
//! the discovery engine, the backup coordinator and the credential store,
//! all built from one [`CoreConfig`].
//!
//! ```ignore
//! let service = BackupService::new(CoreConfig::builder().build()?);
//! service.save_credentials(&credentials).await?;
//! let summary = service.run_backup(false).await?;
//! ```

use crate::{CoreError, Result};
use core_auth::{CredentialStore, ServerCredentials};
use core_discovery::{DiscoveryEngine, LocalFileRef, ScanOutcome, ScanSource, SourceDirectory};
use core_runtime::config::CoreConfig;
use core_runtime::diagnostics::DiagnosticEntry;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use core_runtime::status::StatusReporter;
use core_sync::{BackupCoordinator, BackupRun, BackupSummary};
use provider_webdav::{RemoteDirectory, ServerStatus, WebDavConnector, WebDavError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of [`BackupService::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    /// Contents of `status.php`.
    pub server: ServerStatus,
    /// Whether the credentials were accepted by an authenticated `PROPFIND`.
    pub authenticated: bool,
}

pub struct BackupService {
    config: CoreConfig,
    event_bus: EventBus,
    status: StatusReporter,
    discovery: Arc<DiscoveryEngine>,
    coordinator: Arc<BackupCoordinator>,
    credentials: CredentialStore,
}

impl BackupService {
    pub fn new(config: CoreConfig) -> Self {
        Self::with_status(config, StatusReporter::new())
    }

    /// Build the service with a caller-supplied status reporter, typically
    /// one carrying a UI callback.
    pub fn with_status(config: CoreConfig, status: StatusReporter) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);
        let discovery = Arc::new(DiscoveryEngine::new(&config, event_bus.clone()));
        let coordinator = Arc::new(BackupCoordinator::new(
            &config,
            event_bus.clone(),
            status.clone(),
        ));
        let credentials = CredentialStore::new(Arc::clone(&config.secure_store));

        Self {
            config,
            event_bus,
            status,
            discovery,
            coordinator,
            credentials,
        }
    }

    /// Build the service on desktop bridges with default settings.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop() -> Result<Self> {
        let config = CoreConfig::builder()
            .build()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Scan the configured source directories.
    pub async fn scan(&self, force_rescan: bool) -> Result<ScanOutcome> {
        self.scan_directories(&self.source_directories(), force_rescan)
            .await
    }

    pub async fn scan_directories(
        &self,
        directories: &[SourceDirectory],
        force_rescan: bool,
    ) -> Result<ScanOutcome> {
        Ok(self.discovery.scan(directories, force_rescan).await?)
    }

    pub fn cancel_scan(&self) -> bool {
        self.discovery.cancel()
    }

    pub fn is_scanning(&self) -> bool {
        self.discovery.is_scanning()
    }

    pub fn invalidate_scan_cache(&self) {
        self.discovery.invalidate_cache();
    }

    // ========================================================================
    // Backup
    // ========================================================================

    /// Scan the configured sources and back them up to the configured
    /// target with the stored credentials.
    #[instrument(skip(self))]
    pub async fn run_backup(&self, force_rescan: bool) -> Result<BackupSummary> {
        let credentials = self.credentials.load().await?;
        let target = RemoteDirectory::new(self.config.backup.target_directory.clone());

        // Without credentials the coordinator rejects the run before any
        // I/O, so the scan is skipped too.
        let Some(credentials) = credentials else {
            return Ok(self.coordinator.backup(None, &[], &target).await?);
        };

        let outcome = self.scan(force_rescan).await?;
        match outcome.source {
            ScanSource::Skipped => {
                warn!("Scan already running, backup not started");
                return Err(CoreError::ScanInProgress);
            }
            _ if outcome.cancelled => {
                info!(files = outcome.len(), "Scan cancelled, backup not started");
                return Err(CoreError::ScanCancelled);
            }
            _ => {}
        }

        info!(files = outcome.len(), target = %target, "Starting backup");
        self.backup(Some(&credentials), &outcome.files, &target)
            .await
    }

    /// Back up an explicit file list.
    pub async fn backup(
        &self,
        credentials: Option<&ServerCredentials>,
        files: &[LocalFileRef],
        target: &RemoteDirectory,
    ) -> Result<BackupSummary> {
        Ok(self.coordinator.backup(credentials, files, target).await?)
    }

    pub fn cancel_backup(&self) -> bool {
        self.coordinator.cancel()
    }

    pub fn is_backing_up(&self) -> bool {
        self.coordinator.is_running()
    }

    pub fn last_run(&self) -> Option<BackupRun> {
        self.coordinator.last_run()
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    pub async fn save_credentials(&self, credentials: &ServerCredentials) -> Result<()> {
        Ok(self.credentials.save(credentials).await?)
    }

    pub async fn load_credentials(&self) -> Result<Option<ServerCredentials>> {
        Ok(self.credentials.load().await?)
    }

    pub async fn clear_credentials(&self) -> Result<()> {
        Ok(self.credentials.clear().await?)
    }

    /// Check that the server answers `status.php` and accepts `credentials`.
    ///
    /// Rejected credentials are reported in the result; any other failure
    /// is an error.
    #[instrument(skip(self, credentials), fields(server = %credentials.server_root()))]
    pub async fn test_connection(&self, credentials: &ServerCredentials) -> Result<ConnectionReport> {
        credentials.validate()?;
        let connector =
            WebDavConnector::new(Arc::clone(&self.config.http_client), credentials.clone());

        self.status.report("Checking server...");
        let server = match connector.check_server_status().await {
            Ok(server) => server,
            Err(e) => {
                self.status.report(format!("Cannot reach server: {}", e));
                return Err(e.into());
            }
        };

        let authenticated = match connector.check_connectivity().await {
            Ok(()) => true,
            Err(WebDavError::Authentication { status_code }) => {
                warn!(status_code, "Server rejected credentials");
                false
            }
            Err(e) => {
                self.status.report(format!("Cannot connect to server: {}", e));
                return Err(e.into());
            }
        };

        if authenticated {
            self.status.report(format!(
                "Connected to {} {}",
                display_product(&server),
                server.version
            ));
        } else {
            self.status.report("Server rejected the username or password");
        }

        Ok(ConnectionReport {
            server,
            authenticated,
        })
    }

    // ========================================================================
    // Observability
    // ========================================================================

    /// Latest human-readable status line.
    pub fn status(&self) -> String {
        self.status.current()
    }

    pub fn discovery_log(&self) -> Vec<DiagnosticEntry> {
        self.discovery.diagnostics()
    }

    pub fn upload_log(&self) -> Vec<DiagnosticEntry> {
        self.coordinator.diagnostics()
    }

    fn source_directories(&self) -> Vec<SourceDirectory> {
        self.config
            .backup
            .source_directories
            .iter()
            .map(SourceDirectory::new)
            .collect()
    }
}

fn display_product(server: &ServerStatus) -> &str {
    if server.product_name.is_empty() {
        "WebDAV server"
    } else {
        &server.product_name
    }
}

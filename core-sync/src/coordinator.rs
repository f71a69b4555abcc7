//! # Backup Coordinator
//!
//! Reconciles local photos against a WebDAV directory and uploads what is
//! missing.
//!
//! ## Workflow
//!
//! 1. Reject the request without network I/O when another run is active,
//!    credentials are missing or the target is blank; report "Nothing to
//!    back up" for an empty file list
//! 2. Check connectivity with an authenticated `PROPFIND` (terminal on failure)
//! 3. List the target directory (failures degrade to an empty inventory)
//! 4. Compute the pending set by base name
//! 5. Upload pending files one at a time; a failing file is counted and the
//!    loop moves on
//! 6. Report the summary
//!
//! Cancellation is checked between files. Files already processed keep
//! their outcome and the rest are left for the next run.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::BackupCoordinator;
//!
//! let coordinator = BackupCoordinator::new(&config, event_bus, status);
//! let summary = coordinator
//!     .backup(Some(&credentials), &scan.files, &RemoteDirectory::new("/Photos/Backup"))
//!     .await?;
//! println!("{} uploaded, {} skipped", summary.uploaded, summary.skipped);
//! ```

use crate::{
    reader::ContentReader,
    reconcile::pending_uploads,
    run::{BackupRun, BackupSummary},
    Result, SyncError,
};
use bridge_traits::http::{AttemptReport, HttpClient, RetryPolicy};
use core_auth::ServerCredentials;
use core_discovery::LocalFileRef;
use core_runtime::config::{CoreConfig, UploadSettings};
use core_runtime::diagnostics::{DiagnosticEntry, DiagnosticLog};
use core_runtime::events::{BackupEvent, CoreEvent, EventBus};
use core_runtime::status::StatusReporter;
use parking_lot::{Mutex, RwLock};
use provider_webdav::{RemoteDirectory, WebDavConnector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound on the backoff between upload attempts
const MAX_UPLOAD_BACKOFF: Duration = Duration::from_secs(30);

pub struct BackupCoordinator {
    http_client: Arc<dyn HttpClient>,
    reader: ContentReader,
    settings: UploadSettings,
    event_bus: EventBus,
    status: StatusReporter,
    log: Arc<DiagnosticLog>,
    running: AtomicBool,
    active_token: Mutex<Option<CancellationToken>>,
    last_run: RwLock<Option<BackupRun>>,
}

/// Clears the running state when a run ends, however it ends.
struct RunGuard<'a> {
    coordinator: &'a BackupCoordinator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.active_token.lock().take();
        self.coordinator.running.store(false, Ordering::SeqCst);
    }
}

/// Counters for the upload loop.
#[derive(Default)]
struct Tally {
    uploaded: u64,
    failed: u64,
    cancelled: bool,
}

impl BackupCoordinator {
    pub fn new(config: &CoreConfig, event_bus: EventBus, status: StatusReporter) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            reader: ContentReader::new(Arc::clone(&config.file_reader)),
            settings: config.upload.clone(),
            event_bus,
            status,
            log: Arc::new(DiagnosticLog::upload()),
            running: AtomicBool::new(false),
            active_token: Mutex::new(None),
            last_run: RwLock::new(None),
        }
    }

    /// Back up `source_files` into `target`.
    ///
    /// Returns `Err` only for problems that stop the run as a whole
    /// (another run active, bad configuration, server unreachable).
    /// Per-file failures are counted in the summary.
    #[instrument(skip(self, credentials, source_files, target), fields(files = source_files.len(), target = %target))]
    pub async fn backup(
        &self,
        credentials: Option<&ServerCredentials>,
        source_files: &[LocalFileRef],
        target: &RemoteDirectory,
    ) -> Result<BackupSummary> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Backup already in progress, rejecting request");
            return Err(SyncError::BackupInProgress);
        }
        let _guard = RunGuard { coordinator: self };

        let credentials = match credentials {
            Some(credentials) if credentials.is_complete() => credentials,
            _ => {
                self.status.report("Configure server credentials first");
                return Err(SyncError::MissingCredentials);
            }
        };
        if let Err(e) = credentials.validate() {
            self.status.report(format!("Invalid server settings: {}", e));
            return Err(SyncError::InvalidCredentials(e.to_string()));
        }
        if target.is_blank() {
            self.status.report("Choose a target directory first");
            return Err(SyncError::InvalidTarget(
                "target directory is empty".to_string(),
            ));
        }
        if source_files.is_empty() {
            info!("No local files, nothing to back up");
            self.status.report("Nothing to back up");
            return Ok(BackupSummary::default());
        }

        let token = CancellationToken::new();
        *self.active_token.lock() = Some(token.clone());

        let total = source_files.len() as u64;
        let run = BackupRun::new(target.as_str(), total).start()?;
        let run_id = run.id.to_string();
        self.set_last_run(&run);

        self.log.clear();
        self.log
            .push(format!("Backing up {} files to {}", total, target));
        self.emit(BackupEvent::Started {
            run_id: run_id.clone(),
            total_files: total,
            target_directory: target.to_string(),
        });

        let connector = self.connector(credentials);

        // Phase 1: connectivity
        self.status.report("Checking connection...");
        if let Err(e) = connector.check_connectivity().await {
            error!(error = %e, "Connectivity check failed");
            let message = format!("Cannot connect to server: {}", e);
            self.status.report(message.clone());
            self.log.push(message.clone());
            self.set_last_run(&run.fail(message.clone())?);
            self.emit(BackupEvent::Failed {
                run_id,
                message,
            });
            return Err(SyncError::Connectivity(e));
        }
        self.log.push("Connected");

        // Phase 2: remote inventory
        self.status.report("Checking existing backups...");
        let inventory = connector.list_file_names(target).await;
        if inventory.complete {
            self.log
                .push(format!("{} files already on server", inventory.len()));
        } else {
            self.log.push(format!(
                "Remote listing incomplete ({} names read); existing files may be uploaded again",
                inventory.len()
            ));
        }

        // Phase 3: pending set
        let pending = pending_uploads(source_files, &inventory);
        let skipped = total - pending.len() as u64;
        info!(pending = pending.len(), skipped, "Reconciled with remote directory");
        self.emit(BackupEvent::Progress {
            run_id: run_id.clone(),
            processed: 0,
            pending: pending.len() as u64,
            phase: "uploading".to_string(),
        });

        // Phase 4: uploads
        let tally = self
            .upload_all(&connector, &pending, target, &token, &run_id)
            .await;

        // Phase 5: summary
        let summary = BackupSummary {
            uploaded: tally.uploaded,
            skipped,
            failed: tally.failed,
            total,
            cancelled: tally.cancelled,
        };

        let finished = if summary.cancelled {
            run.cancel(summary)?
        } else {
            run.complete(summary)?
        };
        let duration_ms = finished.duration_ms().unwrap_or(0);
        self.set_last_run(&finished);

        if summary.cancelled {
            info!(uploaded = summary.uploaded, failed = summary.failed, "Backup cancelled");
            self.status.report(format!(
                "Backup cancelled: {} uploaded, {} failed",
                summary.uploaded, summary.failed
            ));
            self.emit(BackupEvent::Cancelled {
                run_id,
                uploaded: summary.uploaded,
                failed: summary.failed,
            });
        } else {
            info!(
                uploaded = summary.uploaded,
                skipped = summary.skipped,
                failed = summary.failed,
                duration_ms,
                "Backup completed"
            );
            self.status.report(completion_message(&summary));
            self.emit(BackupEvent::Completed {
                run_id,
                uploaded: summary.uploaded,
                skipped: summary.skipped,
                failed: summary.failed,
                total: summary.total,
                duration_ms,
            });
        }
        self.log.push(completion_message(&summary));

        Ok(summary)
    }

    /// Ask the running backup to stop before its next file.
    ///
    /// Returns false when no backup is running.
    pub fn cancel(&self) -> bool {
        match self.active_token.lock().as_ref() {
            Some(token) => {
                token.cancel();
                info!("Backup cancellation requested");
                self.status.report("Cancelling backup...");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The most recent run, including one still in progress.
    pub fn last_run(&self) -> Option<BackupRun> {
        self.last_run.read().clone()
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Entries of the upload diagnostic log, oldest first.
    pub fn diagnostics(&self) -> Vec<DiagnosticEntry> {
        self.log.snapshot()
    }

    fn connector(&self, credentials: &ServerCredentials) -> WebDavConnector {
        let policy = RetryPolicy {
            max_attempts: self.settings.max_attempts,
            base_delay: self.settings.base_delay,
            max_delay: MAX_UPLOAD_BACKOFF,
            use_exponential_backoff: true,
        };

        WebDavConnector::new(Arc::clone(&self.http_client), credentials.clone())
            .with_retry_policy(policy)
            .with_upload_timeout(self.settings.request_timeout)
    }

    async fn upload_all(
        &self,
        connector: &WebDavConnector,
        pending: &[LocalFileRef],
        target: &RemoteDirectory,
        token: &CancellationToken,
        run_id: &str,
    ) -> Tally {
        let mut tally = Tally::default();
        let count = pending.len();

        for (index, file) in pending.iter().enumerate() {
            if token.is_cancelled() {
                info!(remaining = count - index, "Stopping uploads after cancellation");
                tally.cancelled = true;
                break;
            }

            let file_name = file.base_name();
            self.status
                .report(format!("Uploading {}/{}: {}", index + 1, count, file_name));
            self.log.push(format!("Uploading {}", file_name));

            let started = Instant::now();
            match self.upload_one(connector, file, target).await {
                Ok(bytes) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tally.uploaded += 1;
                    debug!(file_name, bytes, elapsed_ms, "Uploaded");
                    self.log
                        .push(format!("Uploaded {} ({} ms)", file_name, elapsed_ms));
                    self.emit(BackupEvent::FileUploaded {
                        run_id: run_id.to_string(),
                        file_name: file_name.to_string(),
                        bytes,
                        elapsed_ms,
                    });
                }
                Err(e) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tally.failed += 1;
                    warn!(file_name, error = %e, elapsed_ms, "Upload failed, continuing");
                    self.log
                        .push(format!("Failed {} ({} ms): {}", file_name, elapsed_ms, e));
                    self.emit(BackupEvent::FileFailed {
                        run_id: run_id.to_string(),
                        file_name: file_name.to_string(),
                        message: e.to_string(),
                    });
                }
            }

            self.emit(BackupEvent::Progress {
                run_id: run_id.to_string(),
                processed: (index + 1) as u64,
                pending: count as u64,
                phase: "uploading".to_string(),
            });
        }

        tally
    }

    async fn upload_one(
        &self,
        connector: &WebDavConnector,
        file: &LocalFileRef,
        target: &RemoteDirectory,
    ) -> Result<u64> {
        let content = self.reader.read(file.path()).await?;
        let bytes = content.len() as u64;

        let file_name = file.base_name();
        let log_attempt = |report: &AttemptReport| {
            self.log.push(attempt_line(file_name, report));
        };

        connector
            .upload_observed(target, file_name, content, &log_attempt)
            .await
            .map_err(|e| SyncError::Upload {
                file_name: file_name.to_string(),
                message: e.to_string(),
            })?;

        Ok(bytes)
    }

    fn set_last_run(&self, run: &BackupRun) {
        *self.last_run.write() = Some(run.clone());
    }

    fn emit(&self, event: BackupEvent) {
        self.event_bus.emit(CoreEvent::Backup(event)).ok();
    }
}

fn attempt_line(file_name: &str, report: &AttemptReport) -> String {
    let outcome = match (report.status, &report.error) {
        (Some(status), _) => format!("status {}", status),
        (None, Some(error)) => error.clone(),
        (None, None) => "no response".to_string(),
    };
    let mut line = format!(
        "Attempt {}/{} for {}: {} after {} ms",
        report.attempt,
        report.max_attempts,
        file_name,
        outcome,
        report.elapsed.as_millis()
    );
    if report.will_retry {
        line.push_str(", retrying");
    }
    line
}

fn completion_message(summary: &BackupSummary) -> String {
    if summary.uploaded == 0 && summary.failed == 0 {
        return format!("All {} files already backed up", summary.total);
    }
    format!(
        "Backup complete: {} uploaded, {} skipped, {} failed",
        summary.uploaded, summary.skipped, summary.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_message() {
        let nothing_new = BackupSummary {
            uploaded: 0,
            skipped: 4,
            failed: 0,
            total: 4,
            cancelled: false,
        };
        assert_eq!(completion_message(&nothing_new), "All 4 files already backed up");

        let mixed = BackupSummary {
            uploaded: 2,
            skipped: 1,
            failed: 1,
            total: 4,
            cancelled: false,
        };
        assert_eq!(
            completion_message(&mixed),
            "Backup complete: 2 uploaded, 1 skipped, 1 failed"
        );
    }
}

//! Pluggable enumeration strategies.

use crate::error::Result;
use crate::types::{LocalFileRef, SourceDirectory};
use async_trait::async_trait;
use core_runtime::diagnostics::DiagnosticLog;
use core_runtime::events::{CoreEvent, DiscoveryEvent, EventBus};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// One way of turning source directories into candidate files.
///
/// The engine tries strategies in order and keeps the first non-empty
/// result. A strategy that notices cancellation returns what it has
/// collected so far.
#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    /// Short name used in logs and events.
    fn name(&self) -> &'static str;

    async fn discover(
        &self,
        directories: &[SourceDirectory],
        session: &ScanSession,
    ) -> Result<Vec<LocalFileRef>>;
}

/// State shared by the strategies of a single scan.
pub struct ScanSession {
    token: CancellationToken,
    log: Arc<DiagnosticLog>,
    event_bus: EventBus,
}

impl ScanSession {
    pub fn new(token: CancellationToken, log: Arc<DiagnosticLog>, event_bus: EventBus) -> Self {
        Self {
            token,
            log,
            event_bus,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Append a line to the discovery diagnostic log.
    pub fn note(&self, message: impl Into<String>) {
        self.log.push(message);
    }

    /// Record a source directory that could not be listed.
    pub fn directory_failed(&self, directory: &str, error: &dyn fmt::Display) {
        warn!(directory, error = %error, "Skipping unreadable source directory");
        self.note(format!("Cannot list {}: {}", directory, error));
        self.event_bus
            .emit(CoreEvent::Discovery(DiscoveryEvent::DirectoryFailed {
                directory: directory.to_string(),
                message: error.to_string(),
            }))
            .ok();
    }
}

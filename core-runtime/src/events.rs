//! # Event Bus System
//!
//! Provides an event-driven architecture for the backup core using `tokio::sync::broadcast`.
//! Discovery and backup publish typed events; hosts subscribe to drive progress UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   emit    ┌───────────┐
//! │ DiscoveryEngine ├──────────>│           │   subscribe   ┌────────────┐
//! └─────────────────┘           │ EventBus  ├──────────────>│ Subscriber │
//! ┌─────────────────┐   emit    │ (broadcast│               └────────────┘
//! │BackupCoordinator├──────────>│  channel) │
//! └─────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{BackupEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Backup(BackupEvent::Started {
//!         run_id: "run-1".to_string(),
//!         total_files: 3,
//!         target_directory: "/Photos/Backup".to_string(),
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Backup started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns an error; publishers ignore it with `.ok()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Local discovery events
    Discovery(DiscoveryEvent),
    /// Remote reconciliation and upload events
    Backup(BackupEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Discovery(e) => e.description(),
            CoreEvent::Backup(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Backup(BackupEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Backup(BackupEvent::FileFailed { .. })
            | CoreEvent::Discovery(DiscoveryEvent::DirectoryFailed { .. }) => {
                EventSeverity::Warning
            }
            CoreEvent::Backup(BackupEvent::Completed { .. })
            | CoreEvent::Discovery(DiscoveryEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Discovery Events
// ============================================================================

/// Events emitted while enumerating local photos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum DiscoveryEvent {
    /// A scan began hitting storage.
    Started {
        /// Source directories in scan order.
        directories: Vec<String>,
    },
    /// A fresh cached result was returned without touching storage.
    CacheHit {
        /// Number of files in the cached result.
        file_count: u64,
    },
    /// A source directory could not be listed and was skipped.
    DirectoryFailed {
        directory: String,
        message: String,
    },
    /// A scan finished.
    Completed {
        /// Number of distinct files discovered.
        file_count: u64,
        /// Name of the strategy that produced the result.
        strategy: String,
        duration_ms: u64,
    },
    /// A scan was cancelled; `file_count` is the partial result size.
    Cancelled {
        file_count: u64,
    },
}

impl DiscoveryEvent {
    fn description(&self) -> &str {
        match self {
            DiscoveryEvent::Started { .. } => "Scan started",
            DiscoveryEvent::CacheHit { .. } => "Scan served from cache",
            DiscoveryEvent::DirectoryFailed { .. } => "Source directory skipped",
            DiscoveryEvent::Completed { .. } => "Scan completed",
            DiscoveryEvent::Cancelled { .. } => "Scan cancelled",
        }
    }
}

// ============================================================================
// Backup Events
// ============================================================================

/// Events emitted by a backup run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BackupEvent {
    /// Run accepted; connectivity check is next.
    Started {
        run_id: String,
        total_files: u64,
        target_directory: String,
    },
    /// Pending set computed; uploads are about to begin.
    Progress {
        run_id: String,
        /// Files handled so far (uploaded or failed).
        processed: u64,
        /// Files that need uploading in this run.
        pending: u64,
        /// Human-readable phase.
        phase: String,
    },
    /// One file reached the server.
    FileUploaded {
        run_id: String,
        file_name: String,
        bytes: u64,
        elapsed_ms: u64,
    },
    /// One file could not be uploaded; the run continues.
    FileFailed {
        run_id: String,
        file_name: String,
        message: String,
    },
    /// Run finished.
    Completed {
        run_id: String,
        uploaded: u64,
        skipped: u64,
        failed: u64,
        total: u64,
        duration_ms: u64,
    },
    /// Run stopped before uploading anything (configuration or connectivity).
    Failed {
        run_id: String,
        message: String,
    },
    /// Run was cancelled between files.
    Cancelled {
        run_id: String,
        uploaded: u64,
        failed: u64,
    },
}

impl BackupEvent {
    fn description(&self) -> &str {
        match self {
            BackupEvent::Started { .. } => "Backup started",
            BackupEvent::Progress { .. } => "Backup in progress",
            BackupEvent::FileUploaded { .. } => "File uploaded",
            BackupEvent::FileFailed { .. } => "File upload failed",
            BackupEvent::Completed { .. } => "Backup completed",
            BackupEvent::Failed { .. } => "Backup failed",
            BackupEvent::Cancelled { .. } => "Backup cancelled",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for core events.
///
/// Cloning is cheap; all clones publish to the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let backup_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Backup(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

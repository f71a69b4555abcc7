//! Bounded, timestamped diagnostic logs.
//!
//! Discovery and upload each keep a short history of what happened during
//! their latest session so a host can show it without a log viewer. Entries
//! are evicted oldest-first once the capacity is reached.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capacity of the discovery diagnostic log.
pub const DISCOVERY_LOG_CAPACITY: usize = 20;

/// Capacity of the upload diagnostic log.
pub const UPLOAD_LOG_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Ring buffer of [`DiagnosticEntry`] values.
#[derive(Debug)]
pub struct DiagnosticLog {
    capacity: usize,
    entries: Mutex<VecDeque<DiagnosticEntry>>,
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn discovery() -> Self {
        Self::new(DISCOVERY_LOG_CAPACITY)
    }

    pub fn upload() -> Self {
        Self::new(UPLOAD_LOG_CAPACITY)
    }

    pub fn push(&self, message: impl Into<String>) {
        self.push_at(Utc::now(), message);
    }

    pub fn push_at(&self, timestamp: DateTime<Utc>, message: impl Into<String>) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(DiagnosticEntry {
            timestamp,
            message: message.into(),
        });
    }

    /// Drop all entries; called when a new session starts.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Oldest-first copy of the current entries.
    pub fn snapshot(&self) -> Vec<DiagnosticEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

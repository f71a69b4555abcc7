//! Human-readable status reporting.
//!
//! The backup core reports one line of status at a time ("Checking
//! connection...", "Uploaded 3/10"). Hosts register a callback that is
//! invoked synchronously on every change.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Holds the current status line and notifies an optional observer.
#[derive(Clone, Default)]
pub struct StatusReporter {
    current: Arc<RwLock<String>>,
    callback: Option<StatusCallback>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: StatusCallback) -> Self {
        Self {
            current: Arc::default(),
            callback: Some(callback),
        }
    }

    /// Replace the status line and notify the observer.
    pub fn report(&self, status: impl Into<String>) {
        let status = status.into();
        *self.current.write() = status.clone();
        if let Some(callback) = &self.callback {
            callback(&status);
        }
    }

    pub fn current(&self) -> String {
        self.current.read().clone()
    }
}

impl fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReporter")
            .field("current", &*self.current.read())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

//! # Backup Run State Machine
//!
//! Tracks one backup run from acceptance to its terminal state.
//!
//! ## State Machine
//!
//! ```text
//! Pending → Running → Completed
//!     ↓         ↓
//!     └──────→ Failed
//!     └──────→ Cancelled
//! ```

use crate::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupRunId(Uuid);

impl BackupRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a run ID from its string form
    pub fn from_string(s: &str) -> Result<Self> {
        Ok(Self(
            Uuid::parse_str(s).map_err(|e| SyncError::InvalidRunId(e.to_string()))?,
        ))
    }
}

impl Default for BackupRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BackupRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Status Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl BackupStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BackupStatus::Completed | BackupStatus::Failed | BackupStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Pending => "pending",
            BackupStatus::Running => "running",
            BackupStatus::Completed => "completed",
            BackupStatus::Failed => "failed",
            BackupStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BackupStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BackupStatus::Pending),
            "running" => Ok(BackupStatus::Running),
            "completed" => Ok(BackupStatus::Completed),
            "failed" => Ok(BackupStatus::Failed),
            "cancelled" => Ok(BackupStatus::Cancelled),
            _ => Err(SyncError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Outcome counts of a backup run.
///
/// `skipped` counts files already present remotely by name; `failed`
/// counts files that could not be read or uploaded. Files left unprocessed
/// by a cancellation are in neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSummary {
    pub uploaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub total: u64,
    pub cancelled: bool,
}

impl BackupSummary {
    /// Files that still need uploading after this run.
    pub fn remaining(&self) -> u64 {
        self.total
            .saturating_sub(self.uploaded)
            .saturating_sub(self.skipped)
    }
}

// ============================================================================
// Run Entity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRun {
    pub id: BackupRunId,
    pub status: BackupStatus,
    pub target_directory: String,
    pub total_files: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub summary: Option<BackupSummary>,
    pub error: Option<String>,
}

impl BackupRun {
    pub fn new(target_directory: impl Into<String>, total_files: u64) -> Self {
        Self {
            id: BackupRunId::new(),
            status: BackupStatus::Pending,
            target_directory: target_directory.into(),
            total_files,
            started_at: None,
            completed_at: None,
            summary: None,
            error: None,
        }
    }

    pub fn start(mut self) -> Result<Self> {
        self.validate_transition(BackupStatus::Running)?;
        self.status = BackupStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(self)
    }

    pub fn complete(mut self, summary: BackupSummary) -> Result<Self> {
        self.validate_transition(BackupStatus::Completed)?;
        self.status = BackupStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.summary = Some(summary);
        Ok(self)
    }

    pub fn fail(mut self, error: impl Into<String>) -> Result<Self> {
        self.validate_transition(BackupStatus::Failed)?;
        self.status = BackupStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
        Ok(self)
    }

    /// Stop the run; `summary` holds the outcome of the files processed
    /// before cancellation.
    pub fn cancel(mut self, summary: BackupSummary) -> Result<Self> {
        self.validate_transition(BackupStatus::Cancelled)?;
        self.status = BackupStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        self.summary = Some(summary);
        Ok(self)
    }

    /// Run time in milliseconds, once finished
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds().max(0) as u64),
            _ => None,
        }
    }

    fn validate_transition(&self, to: BackupStatus) -> Result<()> {
        let valid = matches!(
            (self.status, to),
            (BackupStatus::Pending, BackupStatus::Running)
                | (BackupStatus::Pending, BackupStatus::Failed)
                | (BackupStatus::Pending, BackupStatus::Cancelled)
                | (BackupStatus::Running, BackupStatus::Completed)
                | (BackupStatus::Running, BackupStatus::Failed)
                | (BackupStatus::Running, BackupStatus::Cancelled)
        );

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.status.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_round_trip() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = BackupRunId::from_string(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
        assert!(BackupRunId::from_string("nope").is_err());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("RUNNING".parse::<BackupStatus>().unwrap(), BackupStatus::Running);
        assert!("paused".parse::<BackupStatus>().is_err());
        assert!(BackupStatus::Cancelled.is_terminal());
        assert!(!BackupStatus::Pending.is_terminal());
    }

    #[test]
    fn test_run_lifecycle() {
        let run = BackupRun::new("/Photos/Backup", 3).start().unwrap();
        assert_eq!(run.status, BackupStatus::Running);
        assert!(run.started_at.is_some());

        let summary = BackupSummary {
            uploaded: 2,
            skipped: 1,
            failed: 0,
            total: 3,
            cancelled: false,
        };
        let run = run.complete(summary).unwrap();
        assert_eq!(run.status, BackupStatus::Completed);
        assert_eq!(run.summary, Some(summary));
        assert!(run.duration_ms().is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let run = BackupRun::new("/Photos", 1)
            .start()
            .unwrap()
            .fail("server unreachable")
            .unwrap();
        assert_eq!(run.error.as_deref(), Some("server unreachable"));

        assert!(matches!(
            run.clone().start(),
            Err(SyncError::InvalidStateTransition { .. })
        ));
        assert!(run.cancel(BackupSummary::default()).is_err());
    }

    #[test]
    fn test_cannot_complete_before_start() {
        assert!(BackupRun::new("/Photos", 0)
            .complete(BackupSummary::default())
            .is_err());
    }

    #[test]
    fn test_summary_remaining() {
        let summary = BackupSummary {
            uploaded: 1,
            skipped: 2,
            failed: 1,
            total: 5,
            cancelled: true,
        };
        assert_eq!(summary.remaining(), 2);
    }
}

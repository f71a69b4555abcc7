use provider_webdav::WebDavError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Server credentials are not configured")]
    MissingCredentials,

    #[error("Invalid server credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid backup target: {0}")]
    InvalidTarget(String),

    #[error("A backup is already in progress")]
    BackupInProgress,

    #[error("Cannot connect to server: {0}")]
    Connectivity(#[source] WebDavError),

    #[error("Cannot read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Upload of {file_name} failed: {message}")]
    Upload { file_name: String, message: String },

    #[error("Invalid run ID: {0}")]
    InvalidRunId(String),

    #[error("Invalid backup status: {0}")]
    InvalidStatus(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;

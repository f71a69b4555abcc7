use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] core_discovery::DiscoveryError),

    #[error("Backup error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Server error: {0}")]
    WebDav(#[from] provider_webdav::WebDavError),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Scan was cancelled before the backup started")]
    ScanCancelled,
}

pub type Result<T> = std::result::Result<T, CoreError>;

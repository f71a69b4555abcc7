use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid server credentials: {0}")]
    InvalidCredentials(String),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Stored credentials are corrupted: {0}")]
    CredentialsCorrupted(String),

    #[error("Credential serialization failed: {0}")]
    SerializationFailed(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

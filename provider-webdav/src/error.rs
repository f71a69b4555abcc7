//! Error types for the WebDAV provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// WebDAV provider errors
#[derive(Error, Debug)]
pub enum WebDavError {
    /// The server could not be reached at all
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// Server rejected the credentials (401/403)
    #[error("Authentication rejected by server (status {status_code})")]
    Authentication { status_code: u16 },

    /// Server answered with a status the operation does not accept
    #[error("Unexpected WebDAV response (status {status_code}): {message}")]
    UnexpectedStatus { status_code: u16, message: String },

    /// Failed to parse a server response
    #[error("Failed to parse server response: {0}")]
    Parse(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for WebDAV operations
pub type Result<T> = std::result::Result<T, WebDavError>;

impl WebDavError {
    /// Classify a non-accepted HTTP status.
    pub fn from_status(status_code: u16, body: &[u8]) -> Self {
        match status_code {
            401 | 403 => WebDavError::Authentication { status_code },
            _ => WebDavError::UnexpectedStatus {
                status_code,
                message: summarize_body(body),
            },
        }
    }
}

/// First line of a response body, shortened for logs and status text.
fn summarize_body(body: &[u8]) -> String {
    const MAX_LEN: usize = 120;
    let text = String::from_utf8_lossy(body);
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() > MAX_LEN {
        let truncated: String = line.chars().take(MAX_LEN).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}

impl From<WebDavError> for BridgeError {
    fn from(error: WebDavError) -> Self {
        match error {
            WebDavError::Unreachable(msg) => {
                BridgeError::OperationFailed(format!("Server unreachable: {}", msg))
            }
            WebDavError::Authentication { status_code } => BridgeError::PermissionDenied(format!(
                "Authentication rejected (status {})",
                status_code
            )),
            WebDavError::UnexpectedStatus {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "WebDAV error (status {}): {}",
                status_code, message
            )),
            WebDavError::Parse(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            WebDavError::Bridge(e) => e,
        }
    }
}

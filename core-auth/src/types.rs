//! Credential types

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login for a Nextcloud-style WebDAV server.
///
/// `server_url` is the server root as the user typed it
/// (`https://cloud.example.com` or `https://example.com/nextcloud`).
/// The password is often an app password; it never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredentials {
    pub server_url: String,
    pub username: String,
    pub password: String,
}

impl ServerCredentials {
    pub fn new(
        server_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// All three fields are present.
    pub fn is_complete(&self) -> bool {
        !self.server_url.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.is_empty()
    }

    /// Server root without a trailing slash.
    pub fn server_root(&self) -> &str {
        self.server_url.trim().trim_end_matches('/')
    }

    /// Check the credentials are usable before any request is made.
    pub fn validate(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(AuthError::InvalidCredentials(
                "server URL, username and password are all required".to_string(),
            ));
        }

        let root = self.server_root();
        if !(root.starts_with("https://") || root.starts_with("http://")) {
            return Err(AuthError::InvalidCredentials(format!(
                "server URL must start with http:// or https:// (got '{}')",
                root
            )));
        }

        if self.username.contains('/') {
            return Err(AuthError::InvalidCredentials(
                "username cannot contain '/'".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

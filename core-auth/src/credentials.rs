//! Persistent storage for server credentials.
//!
//! Credentials are serialized as JSON and kept in the platform secure store
//! under a single key. Corrupted entries are removed on load so the user is
//! asked to sign in again instead of failing every backup.

use crate::error::{AuthError, Result};
use crate::types::ServerCredentials;
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Secure store key holding the serialized [`ServerCredentials`].
pub const CREDENTIALS_KEY: &str = "webdav.credentials";

pub struct CredentialStore {
    secure_store: Arc<dyn SecureStore>,
}

impl CredentialStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self { secure_store }
    }

    /// Validate and persist credentials, replacing any previous login.
    pub async fn save(&self, credentials: &ServerCredentials) -> Result<()> {
        credentials.validate()?;

        let json = serde_json::to_vec(credentials)
            .map_err(|e| AuthError::SerializationFailed(e.to_string()))?;

        self.secure_store
            .set_secret(CREDENTIALS_KEY, &json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store credentials");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(
            server = credentials.server_root(),
            username = %credentials.username,
            "Stored server credentials"
        );
        Ok(())
    }

    /// Load stored credentials; `Ok(None)` when nothing was saved.
    pub async fn load(&self) -> Result<Option<ServerCredentials>> {
        let data = self
            .secure_store
            .get_secret(CREDENTIALS_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;

        let Some(bytes) = data else {
            debug!("No stored credentials");
            return Ok(None);
        };

        match serde_json::from_slice::<ServerCredentials>(&bytes) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                warn!(error = %e, "Stored credentials are corrupted, removing them");
                if let Err(delete_err) = self.secure_store.delete_secret(CREDENTIALS_KEY).await {
                    warn!(error = %delete_err, "Failed to remove corrupted credentials");
                }
                Err(AuthError::CredentialsCorrupted(e.to_string()))
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.secure_store
            .delete_secret(CREDENTIALS_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;
        info!("Cleared server credentials");
        Ok(())
    }

    pub async fn has_credentials(&self) -> Result<bool> {
        self.secure_store
            .has_secret(CREDENTIALS_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))
    }
}

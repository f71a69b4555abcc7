//! Storage and File System Abstractions
//!
//! Provides platform-agnostic traits for directory enumeration, file reads,
//! and secure credential storage.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// Type hint reported by a directory listing.
///
/// Platforms differ in how much they know about a child without a separate
/// stat call, so callers treat this as advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Unknown,
}

/// Immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Raw directory enumeration
///
/// Abstracts directory listing across platforms:
/// - Desktop: Direct filesystem access
/// - Android: scoped storage / SAF document trees
/// - iOS: app sandbox and photo library exports
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::DirectoryLister;
///
/// async fn count(lister: &dyn DirectoryLister) -> Result<usize> {
///     Ok(lister.list_directory(Path::new("/DCIM/Camera")).await?.len())
/// }
/// ```
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// List the immediate children of a directory
    ///
    /// Fails when the path does not exist, is not a directory, or cannot be read.
    async fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;
}

/// File content access
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Root of the shared storage volume, when the platform has one.
    ///
    /// Used to resolve paths reported relative to the volume root.
    fn storage_root(&self) -> Option<PathBuf> {
        None
    }
}

/// Secure credential storage trait
///
/// Abstracts secure storage mechanisms:
/// - macOS/iOS: Keychain
/// - Android: Keystore (hardware-backed when available)
/// - Windows: DPAPI
/// - Linux: Secret Service / libsecret
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Encrypt data at rest
/// - Use platform-provided secure storage when available
/// - Never log or expose sensitive data
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_password(store: &dyn SecureStore, password: &str) -> Result<()> {
///     store.set_secret("webdav.password", password.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value
    ///
    /// # Arguments
    ///
    /// * `key` - Unique identifier for the secret
    /// * `value` - Secret data to store
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret
    ///
    /// Deleting a missing key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{DirEntry, DirectoryLister, EntryKind, FileMetadata, FileReader},
};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Provides directory listing, stat and reads using `tokio::fs`. Relative
/// paths are listed and stat'ed against the storage root; reads take the
/// path exactly as given.
pub struct TokioFileSystem {
    storage_root: Option<PathBuf>,
}

impl TokioFileSystem {
    /// Create a file system accessor rooted at the user's home directory
    pub fn new() -> Self {
        Self {
            storage_root: dirs::home_dir(),
        }
    }

    /// Create a file system accessor with a custom storage root
    pub fn with_storage_root(root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.storage_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Convert std::io::Error to BridgeError, keeping the path for context
    fn map_io_error(path: &Path, e: std::io::Error) -> BridgeError {
        match e.kind() {
            ErrorKind::NotFound => BridgeError::NotFound(path.display().to_string()),
            ErrorKind::PermissionDenied => {
                BridgeError::PermissionDenied(path.display().to_string())
            }
            _ => BridgeError::Io(e),
        }
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryLister for TokioFileSystem {
    async fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let target = self.resolve(path);
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&target)
            .await
            .map_err(|e| Self::map_io_error(&target, e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Self::map_io_error(&target, e))?
        {
            let kind = match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
                Ok(file_type) if file_type.is_file() => EntryKind::File,
                _ => EntryKind::Unknown,
            };
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy().into_owned(),
                kind,
            ));
        }

        debug!(path = ?target, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let target = self.resolve(path);
        let metadata = fs::metadata(&target)
            .await
            .map_err(|e| Self::map_io_error(&target, e))?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            is_directory: metadata.is_dir(),
        })
    }
}

#[async_trait]
impl FileReader for TokioFileSystem {
    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    fn storage_root(&self) -> Option<PathBuf> {
        self.storage_root.clone()
    }
}

//! Local content reads with path fallbacks.
//!
//! Discovered paths do not always match what the file reader expects:
//! catalogs report absolute paths while the directory walk produces
//! storage-root relative ones. Reads try, in order:
//!
//! 1. the path as given
//! 2. the path joined onto the reader's storage root
//! 3. the path with leading slashes removed

use crate::{Result, SyncError};
use bridge_traits::storage::FileReader;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

pub struct ContentReader {
    reader: Arc<dyn FileReader>,
}

impl ContentReader {
    pub fn new(reader: Arc<dyn FileReader>) -> Self {
        Self { reader }
    }

    /// Distinct candidate locations for `path`, in the order they are tried.
    pub fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let stripped = path.trim_start_matches(['/', '\\']);

        let mut candidates = vec![PathBuf::from(path)];
        if let Some(root) = self.reader.storage_root() {
            candidates.push(root.join(stripped));
        }
        candidates.push(PathBuf::from(stripped));

        let mut unique: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.as_os_str().is_empty() && !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        unique
    }

    /// Read the first candidate that succeeds.
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        let mut last_error = None;

        for candidate in self.candidates(path) {
            match self.reader.read_file(&candidate).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    trace!(candidate = %candidate.display(), error = %e, "Read attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(SyncError::Read {
            path: path.to_string(),
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no readable location".to_string()),
        })
    }
}

//! Time-boxed scan result cache.

use crate::types::{LocalFileRef, SourceDirectory};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Result of the last completed scan.
///
/// Immutable once built; the engine swaps whole values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCache {
    pub directories: Vec<SourceDirectory>,
    pub files: Vec<LocalFileRef>,
    pub timestamp: DateTime<Utc>,
}

impl ScanCache {
    pub fn new(
        directories: Vec<SourceDirectory>,
        files: Vec<LocalFileRef>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            directories,
            files,
            timestamp,
        }
    }

    /// Usable for `directories` at `now`: same sequence (length, order and
    /// members) and younger than `ttl`.
    pub fn is_valid_for(&self, directories: &[SourceDirectory], now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.directories.as_slice() != directories {
            return false;
        }

        let age = now.signed_duration_since(self.timestamp);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age >= chrono::Duration::zero() && age < ttl,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(paths: &[&str]) -> Vec<SourceDirectory> {
        paths.iter().map(|p| SourceDirectory::new(*p)).collect()
    }

    #[test]
    fn test_validity_window() {
        let start = Utc::now();
        let cache = ScanCache::new(dirs(&["/DCIM/Camera"]), vec![], start);
        let ttl = Duration::from_secs(30);

        assert!(cache.is_valid_for(&dirs(&["/DCIM/Camera"]), start, ttl));
        assert!(cache.is_valid_for(
            &dirs(&["/DCIM/Camera"]),
            start + chrono::Duration::seconds(29),
            ttl
        ));
        assert!(!cache.is_valid_for(
            &dirs(&["/DCIM/Camera"]),
            start + chrono::Duration::seconds(30),
            ttl
        ));
    }

    #[test]
    fn test_sequence_must_match_positionally() {
        let now = Utc::now();
        let cache = ScanCache::new(dirs(&["/a", "/b"]), vec![], now);
        let ttl = Duration::from_secs(30);

        assert!(cache.is_valid_for(&dirs(&["/a", "/b"]), now, ttl));
        assert!(!cache.is_valid_for(&dirs(&["/b", "/a"]), now, ttl));
        assert!(!cache.is_valid_for(&dirs(&["/a"]), now, ttl));
        assert!(!cache.is_valid_for(&dirs(&["/a", "/b", "/b"]), now, ttl));
    }
}

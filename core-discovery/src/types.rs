//! Discovery value types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Paths
// ============================================================================

/// A local directory to search for photos, as configured by the user.
///
/// Paths are storage-root relative in spirit (`/DCIM/Camera`); the leading
/// slash is cosmetic and removed by [`SourceDirectory::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDirectory(String);

impl SourceDirectory {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path with surrounding whitespace and slashes removed.
    pub fn normalized(&self) -> &str {
        self.0.trim().trim_matches('/')
    }
}

impl fmt::Display for SourceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceDirectory {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for SourceDirectory {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// A discovered local file. The path is opaque to the core; only its base
/// name is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalFileRef(String);

impl LocalFileRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// Final path segment, accepting both `/` and `\` separators.
    pub fn base_name(&self) -> &str {
        self.0
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
    }
}

impl fmt::Display for LocalFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalFileRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for LocalFileRef {
    fn from(path: String) -> Self {
        Self(path)
    }
}

// ============================================================================
// Scan results
// ============================================================================

/// Where a scan result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    /// Served from the result cache without touching storage.
    Cache,
    /// Produced by the named strategy (or the last one tried).
    Strategy(&'static str),
    /// Another scan was already running; nothing was done.
    Skipped,
}

/// Result of [`DiscoveryEngine::scan`](crate::DiscoveryEngine::scan).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Distinct file paths in discovery order.
    pub files: Vec<LocalFileRef>,
    pub source: ScanSource,
    /// True when the scan stopped early; `files` is then a partial result.
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn skipped() -> Self {
        Self {
            files: Vec::new(),
            source: ScanSource::Skipped,
            cancelled: false,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        assert_eq!(SourceDirectory::new("/DCIM/Camera/").normalized(), "DCIM/Camera");
        assert_eq!(SourceDirectory::new("Pictures").normalized(), "Pictures");
        assert_eq!(SourceDirectory::new("/").normalized(), "");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(LocalFileRef::new("DCIM/Camera/IMG_1.jpg").base_name(), "IMG_1.jpg");
        assert_eq!(LocalFileRef::new(r"C:\Photos\a.png").base_name(), "a.png");
        assert_eq!(LocalFileRef::new("b.heic").base_name(), "b.heic");
    }
}

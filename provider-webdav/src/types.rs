//! WebDAV provider types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Directory on the server, relative to the user's files root
/// (for example `/Photos/Backup`).
///
/// The directory must already exist; uploads never create collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteDirectory(String);

impl RemoteDirectory {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path without surrounding whitespace or slashes. Empty for the user root.
    pub fn normalized(&self) -> &str {
        self.0.trim().trim_matches('/')
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.normalized().split('/').filter(|s| !s.is_empty())
    }

    /// True when no target was given at all.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RemoteDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteDirectory {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for RemoteDirectory {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Names already present in a remote directory.
///
/// `complete` is false when the listing failed or the response could only be
/// partially parsed; `names` then holds whatever was recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteInventory {
    pub names: HashSet<String>,
    pub complete: bool,
}

impl RemoteInventory {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Subset of the `status.php` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "productname")]
    pub product_name: String,
}

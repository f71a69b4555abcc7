//! Media Catalog Abstraction
//!
//! Platforms that maintain an index of photos (Android `MediaStore`, the iOS
//! photo library) can answer "which images exist" with a single query instead
//! of a directory walk.

use async_trait::async_trait;

use crate::error::Result;

/// One indexed image as reported by the platform catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Absolute path of the image on the device
    pub path: String,
}

impl CatalogEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Indexed media catalog
///
/// Optional capability; callers fall back to walking directories when it is
/// absent or returns nothing useful.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Return every image entry the catalog knows about.
    async fn query_images(&self) -> Result<Vec<CatalogEntry>>;
}

//! Media catalog strategy.

use crate::error::{DiscoveryError, Result};
use crate::strategy::{DiscoveryStrategy, ScanSession};
use crate::types::{LocalFileRef, SourceDirectory};
use async_trait::async_trait;
use bridge_traits::catalog::MediaCatalog;
use std::sync::Arc;
use tracing::debug;

/// Asks the platform media index for every image in one query and keeps
/// the entries that live under a source directory.
///
/// Matching is a case-insensitive substring test on the entry path, since
/// catalogs report absolute paths (`/storage/emulated/0/DCIM/Camera/...`)
/// while source directories are written relative to the storage root.
pub struct CatalogStrategy {
    catalog: Arc<dyn MediaCatalog>,
}

impl CatalogStrategy {
    pub const NAME: &'static str = "catalog";

    pub fn new(catalog: Arc<dyn MediaCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl DiscoveryStrategy for CatalogStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn discover(
        &self,
        directories: &[SourceDirectory],
        session: &ScanSession,
    ) -> Result<Vec<LocalFileRef>> {
        let entries = self
            .catalog
            .query_images()
            .await
            .map_err(|e| DiscoveryError::Strategy {
                strategy: Self::NAME,
                message: e.to_string(),
            })?;

        let needles: Vec<String> = directories
            .iter()
            .map(|d| d.normalized().to_lowercase())
            .collect();

        let mut files = Vec::new();
        for entry in entries {
            if session.is_cancelled() {
                break;
            }
            let haystack = entry.path.to_lowercase();
            if needles.iter().any(|needle| haystack.contains(needle.as_str())) {
                files.push(LocalFileRef::new(entry.path));
            }
        }

        debug!(matched = files.len(), "Catalog query finished");
        session.note(format!("Catalog matched {} images", files.len()));
        Ok(files)
    }
}

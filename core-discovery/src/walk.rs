//! Recursive directory walk strategy.

use crate::classify::{accept_unconfirmed, has_photo_extension, join, EntryClass};
use crate::error::Result;
use crate::strategy::{DiscoveryStrategy, ScanSession};
use crate::types::{LocalFileRef, SourceDirectory};
use async_trait::async_trait;
use bridge_traits::storage::{DirEntry, DirectoryLister};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, trace};

type WalkFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Lists each source directory and descends into subdirectories.
///
/// Entries are classified as follows:
///
/// 1. A photo extension wins. The entry is confirmed with a stat; if the
///    stat itself fails the entry is still kept unless it sits under a
///    reserved system location.
/// 2. Anything else is probed by listing it. Success means a directory,
///    failure means a non-photo file.
///
/// The source directory is depth 0. Directories deeper than `max_depth`
/// are never listed.
pub struct WalkStrategy {
    lister: Arc<dyn DirectoryLister>,
    max_depth: usize,
}

impl WalkStrategy {
    pub const NAME: &'static str = "walk";

    pub fn new(lister: Arc<dyn DirectoryLister>, max_depth: usize) -> Self {
        Self { lister, max_depth }
    }

    async fn classify_photo(&self, path: &str) -> EntryClass {
        match self.lister.metadata(Path::new(path)).await {
            Ok(meta) if meta.is_directory => EntryClass::Directory,
            Ok(_) => EntryClass::File,
            Err(e) => {
                debug!(path, error = %e, "Stat failed for photo candidate");
                EntryClass::Unknown
            }
        }
    }

    fn walk<'a>(
        &'a self,
        parent: &'a str,
        entries: Vec<DirEntry>,
        depth: usize,
        session: &'a ScanSession,
        files: &'a mut Vec<LocalFileRef>,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            for entry in entries {
                if session.is_cancelled() {
                    return;
                }

                let path = join(parent, &entry.name);

                if has_photo_extension(&entry.name) {
                    match self.classify_photo(&path).await {
                        EntryClass::File => files.push(LocalFileRef::new(path)),
                        EntryClass::Unknown => {
                            if accept_unconfirmed(&path) {
                                files.push(LocalFileRef::new(path));
                            } else {
                                trace!(path = %path, "Unconfirmed entry under reserved path");
                            }
                        }
                        EntryClass::Directory => {
                            self.descend(path, depth, session, files).await;
                        }
                    }
                } else {
                    self.descend(path, depth, session, files).await;
                }
            }
        })
    }

    fn descend<'a>(
        &'a self,
        path: String,
        depth: usize,
        session: &'a ScanSession,
        files: &'a mut Vec<LocalFileRef>,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let child_depth = depth + 1;
            if child_depth > self.max_depth {
                trace!(path = %path, "Depth limit reached");
                return;
            }
            if session.is_cancelled() {
                return;
            }

            match self.lister.list_directory(Path::new(&path)).await {
                Ok(children) => {
                    self.walk(&path, children, child_depth, session, files).await;
                }
                Err(e) => {
                    trace!(path = %path, error = %e, "Not a listable directory");
                }
            }
        })
    }
}

#[async_trait]
impl DiscoveryStrategy for WalkStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn discover(
        &self,
        directories: &[SourceDirectory],
        session: &ScanSession,
    ) -> Result<Vec<LocalFileRef>> {
        let mut files = Vec::new();

        for directory in directories {
            if session.is_cancelled() {
                break;
            }

            let root = directory.normalized();
            match self.lister.list_directory(Path::new(root)).await {
                Ok(entries) => {
                    let before = files.len();
                    self.walk(root, entries, 0, session, &mut files).await;
                    session.note(format!(
                        "{}: {} photos",
                        directory,
                        files.len() - before
                    ));
                }
                Err(e) => session.directory_failed(directory.as_str(), &e),
            }
        }

        Ok(files)
    }
}

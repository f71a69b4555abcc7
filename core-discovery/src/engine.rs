//! # Discovery Engine
//!
//! Enumerates candidate photos from the configured source directories.
//!
//! ## Workflow
//!
//! 1. Substitute the default source when no directory is given
//! 2. Return the cached result when it is fresh and was built for the same
//!    directory sequence
//! 3. Run the strategies in order (catalog first when available, then the
//!    directory walk); the first non-empty result wins
//! 4. Deduplicate while keeping discovery order
//! 5. Replace the cache, unless the scan was cancelled
//!
//! Only one scan runs at a time. A second caller gets an empty
//! [`ScanSource::Skipped`] outcome immediately.

use crate::cache::ScanCache;
use crate::catalog::CatalogStrategy;
use crate::error::{DiscoveryError, Result};
use crate::strategy::{DiscoveryStrategy, ScanSession};
use crate::types::{LocalFileRef, ScanOutcome, ScanSource, SourceDirectory};
use crate::walk::WalkStrategy;
use bridge_traits::time::Clock;
use core_runtime::config::{CoreConfig, ScanSettings};
use core_runtime::diagnostics::{DiagnosticEntry, DiagnosticLog};
use core_runtime::events::{CoreEvent, DiscoveryEvent, EventBus};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub struct DiscoveryEngine {
    strategies: Vec<Arc<dyn DiscoveryStrategy>>,
    clock: Arc<dyn Clock>,
    settings: ScanSettings,
    event_bus: EventBus,
    log: Arc<DiagnosticLog>,
    cache: RwLock<Option<Arc<ScanCache>>>,
    scanning: AtomicBool,
    active_token: Mutex<Option<CancellationToken>>,
}

/// Clears the running state when a scan ends, however it ends.
struct ScanGuard<'a> {
    engine: &'a DiscoveryEngine,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.engine.active_token.lock().take();
        self.engine.scanning.store(false, Ordering::SeqCst);
    }
}

impl DiscoveryEngine {
    /// Build the engine from core configuration.
    ///
    /// The catalog strategy is only installed when a media catalog was
    /// configured; the walk strategy is always last.
    pub fn new(config: &CoreConfig, event_bus: EventBus) -> Self {
        let mut strategies: Vec<Arc<dyn DiscoveryStrategy>> = Vec::new();
        if let Some(catalog) = &config.media_catalog {
            strategies.push(Arc::new(CatalogStrategy::new(Arc::clone(catalog))));
        }
        strategies.push(Arc::new(WalkStrategy::new(
            Arc::clone(&config.directory_lister),
            config.scan.max_depth,
        )));

        Self::with_strategies(strategies, Arc::clone(&config.clock), config.scan.clone(), event_bus)
    }

    pub fn with_strategies(
        strategies: Vec<Arc<dyn DiscoveryStrategy>>,
        clock: Arc<dyn Clock>,
        settings: ScanSettings,
        event_bus: EventBus,
    ) -> Self {
        Self {
            strategies,
            clock,
            settings,
            event_bus,
            log: Arc::new(DiagnosticLog::discovery()),
            cache: RwLock::new(None),
            scanning: AtomicBool::new(false),
            active_token: Mutex::new(None),
        }
    }

    /// Enumerate photos under `source_dirs`.
    ///
    /// Per-directory failures are logged and skipped. Cancellation yields
    /// the partial result with `cancelled` set and leaves the cache alone.
    #[instrument(skip(self, source_dirs), fields(directories = source_dirs.len()))]
    pub async fn scan(
        &self,
        source_dirs: &[SourceDirectory],
        force_rescan: bool,
    ) -> Result<ScanOutcome> {
        let directories = self.effective_directories(source_dirs)?;

        if !force_rescan {
            if let Some(cached) = self.fresh_cache(&directories) {
                debug!(files = cached.files.len(), "Serving scan from cache");
                self.log
                    .push(format!("Served {} files from cache", cached.files.len()));
                self.emit(DiscoveryEvent::CacheHit {
                    file_count: cached.files.len() as u64,
                });
                return Ok(ScanOutcome {
                    files: cached.files.clone(),
                    source: ScanSource::Cache,
                    cancelled: false,
                });
            }
        }

        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Scan already in progress, ignoring request");
            return Ok(ScanOutcome::skipped());
        }
        let _guard = ScanGuard { engine: self };

        let token = CancellationToken::new();
        *self.active_token.lock() = Some(token.clone());

        self.log.clear();
        self.log.push(format!(
            "Scanning {} (force: {})",
            join_display(&directories),
            force_rescan
        ));
        self.emit(DiscoveryEvent::Started {
            directories: directories.iter().map(|d| d.as_str().to_string()).collect(),
        });

        let started = Instant::now();
        let session = ScanSession::new(token, Arc::clone(&self.log), self.event_bus.clone());
        let (files, strategy) = self.run_strategies(&directories, &session).await;
        let files = dedup(files);

        if session.is_cancelled() {
            info!(files = files.len(), "Scan cancelled");
            self.log
                .push(format!("Cancelled with {} files found", files.len()));
            self.emit(DiscoveryEvent::Cancelled {
                file_count: files.len() as u64,
            });
            return Ok(ScanOutcome {
                files,
                source: ScanSource::Strategy(strategy),
                cancelled: true,
            });
        }

        *self.cache.write() = Some(Arc::new(ScanCache::new(
            directories,
            files.clone(),
            self.clock.now(),
        )));

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(files = files.len(), strategy, duration_ms, "Scan completed");
        self.log.push(format!(
            "Found {} files via {} in {} ms",
            files.len(),
            strategy,
            duration_ms
        ));
        self.emit(DiscoveryEvent::Completed {
            file_count: files.len() as u64,
            strategy: strategy.to_string(),
            duration_ms,
        });

        Ok(ScanOutcome {
            files,
            source: ScanSource::Strategy(strategy),
            cancelled: false,
        })
    }

    /// Request cancellation of the running scan.
    ///
    /// Returns false when no scan is running.
    pub fn cancel(&self) -> bool {
        match self.active_token.lock().as_ref() {
            Some(token) => {
                token.cancel();
                info!("Scan cancellation requested");
                true
            }
            None => false,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Drop the cached result so the next scan hits storage.
    pub fn invalidate_cache(&self) {
        self.cache.write().take();
    }

    pub fn cached(&self) -> Option<Arc<ScanCache>> {
        self.cache.read().clone()
    }

    /// Entries of the discovery diagnostic log, oldest first.
    pub fn diagnostics(&self) -> Vec<DiagnosticEntry> {
        self.log.snapshot()
    }

    fn effective_directories(&self, source_dirs: &[SourceDirectory]) -> Result<Vec<SourceDirectory>> {
        if !source_dirs.is_empty() {
            return Ok(source_dirs.to_vec());
        }
        if self.settings.default_source.trim().is_empty() {
            return Err(DiscoveryError::NoSourceDirectories);
        }
        Ok(vec![SourceDirectory::new(self.settings.default_source.clone())])
    }

    fn fresh_cache(&self, directories: &[SourceDirectory]) -> Option<Arc<ScanCache>> {
        let cache = self.cache.read().clone()?;
        cache
            .is_valid_for(directories, self.clock.now(), self.settings.cache_ttl)
            .then_some(cache)
    }

    async fn run_strategies(
        &self,
        directories: &[SourceDirectory],
        session: &ScanSession,
    ) -> (Vec<LocalFileRef>, &'static str) {
        let mut last = "none";

        for strategy in &self.strategies {
            if session.is_cancelled() {
                break;
            }
            last = strategy.name();

            match strategy.discover(directories, session).await {
                Ok(files) if !files.is_empty() => return (files, last),
                Ok(_) => {
                    debug!(strategy = last, "Strategy found nothing");
                    session.note(format!("{} found nothing", last));
                }
                Err(e) => {
                    warn!(strategy = last, error = %e, "Strategy failed, trying next");
                    session.note(format!("{} failed: {}", last, e));
                }
            }
        }

        (Vec::new(), last)
    }

    fn emit(&self, event: DiscoveryEvent) {
        self.event_bus.emit(CoreEvent::Discovery(event)).ok();
    }
}

fn dedup(files: Vec<LocalFileRef>) -> Vec<LocalFileRef> {
    let mut seen = HashSet::with_capacity(files.len());
    files
        .into_iter()
        .filter(|file| seen.insert(file.clone()))
        .collect()
}

fn join_display(directories: &[SourceDirectory]) -> String {
    directories
        .iter()
        .map(SourceDirectory::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

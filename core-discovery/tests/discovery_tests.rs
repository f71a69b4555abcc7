//! Discovery engine behaviour against an in-memory storage tree.

use async_trait::async_trait;
use bridge_traits::catalog::{CatalogEntry, MediaCatalog};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::{DirEntry, DirectoryLister, EntryKind, FileMetadata};
use bridge_traits::time::Clock;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use core_discovery::{
    CatalogStrategy, DiscoveryEngine, DiscoveryStrategy, ScanSource, SourceDirectory,
    WalkStrategy,
};
use core_runtime::config::ScanSettings;
use core_runtime::events::{CoreEvent, DiscoveryEvent, EventBus};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeFs {
    dirs: Mutex<HashMap<String, Vec<DirEntry>>>,
    files: Mutex<HashSet<String>>,
    stat_failures: Mutex<HashSet<String>>,
    list_calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Gate>>,
}

/// Blocks the listing of one directory until released.
struct Gate {
    path: String,
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

fn parent_and_name(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent.to_string(), name.to_string()),
        None => (String::new(), path.to_string()),
    }
}

impl FakeFs {
    fn new() -> Arc<Self> {
        let fs = Self::default();
        fs.dirs.lock().insert(String::new(), Vec::new());
        Arc::new(fs)
    }

    fn dir(self: &Arc<Self>, path: &str) -> Arc<Self> {
        self.ensure_dir(path);
        Arc::clone(self)
    }

    fn file(self: &Arc<Self>, path: &str) -> Arc<Self> {
        self.add_file(path, EntryKind::File);
        Arc::clone(self)
    }

    /// File whose listing entry carries no type hint.
    fn untyped_file(self: &Arc<Self>, path: &str) -> Arc<Self> {
        self.add_file(path, EntryKind::Unknown);
        Arc::clone(self)
    }

    /// Directory whose listing entry claims it is a file.
    fn mislabelled_dir(self: &Arc<Self>, path: &str) -> Arc<Self> {
        self.ensure_dir(path);
        let (parent, name) = parent_and_name(path);
        if let Some(entries) = self.dirs.lock().get_mut(&parent) {
            for entry in entries.iter_mut().filter(|e| e.name == name) {
                entry.kind = EntryKind::File;
            }
        }
        Arc::clone(self)
    }

    /// Photo-named file whose stat fails.
    fn unstattable(self: &Arc<Self>, path: &str) -> Arc<Self> {
        self.add_file(path, EntryKind::Unknown);
        self.stat_failures.lock().insert(path.to_string());
        Arc::clone(self)
    }

    fn gate(self: &Arc<Self>, path: &str) -> (Arc<Notify>, Arc<Notify>) {
        let reached = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock() = Some(Gate {
            path: path.to_string(),
            reached: Arc::clone(&reached),
            release: Arc::clone(&release),
        });
        (reached, release)
    }

    fn ensure_dir(&self, path: &str) {
        if self.dirs.lock().contains_key(path) {
            return;
        }
        let (parent, name) = parent_and_name(path);
        self.ensure_dir(&parent);
        let mut dirs = self.dirs.lock();
        dirs.insert(path.to_string(), Vec::new());
        if let Some(entries) = dirs.get_mut(&parent) {
            entries.push(DirEntry::new(name, EntryKind::Unknown));
        }
    }

    fn add_file(&self, path: &str, kind: EntryKind) {
        let (parent, name) = parent_and_name(path);
        self.ensure_dir(&parent);
        if let Some(entries) = self.dirs.lock().get_mut(&parent) {
            entries.push(DirEntry::new(name, kind));
        }
        self.files.lock().insert(path.to_string());
    }

    fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().clone()
    }

    fn reset_calls(&self) {
        self.list_calls.lock().clear();
    }
}

#[async_trait]
impl DirectoryLister for FakeFs {
    async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<DirEntry>> {
        let key = path.to_string_lossy().to_string();
        self.list_calls.lock().push(key.clone());

        let gate = {
            let gate = self.gate.lock();
            gate.as_ref()
                .filter(|g| g.path == key)
                .map(|g| (Arc::clone(&g.reached), Arc::clone(&g.release)))
        };
        if let Some((reached, release)) = gate {
            reached.notify_one();
            release.notified().await;
        }

        self.dirs
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(key))
    }

    async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata> {
        let key = path.to_string_lossy().to_string();
        if self.stat_failures.lock().contains(&key) {
            return Err(BridgeError::PermissionDenied(key));
        }
        if self.dirs.lock().contains_key(&key) {
            return Ok(FileMetadata {
                size: 0,
                modified_at: None,
                is_directory: true,
            });
        }
        if self.files.lock().contains(&key) {
            return Ok(FileMetadata {
                size: 1024,
                modified_at: None,
                is_directory: false,
            });
        }
        Err(BridgeError::NotFound(key))
    }
}

struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
        })
    }

    fn advance(&self, seconds: i64) {
        *self.now.lock() += ChronoDuration::seconds(seconds);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

struct FakeCatalog {
    result: Mutex<Option<BridgeResult<Vec<CatalogEntry>>>>,
}

impl FakeCatalog {
    fn with_paths(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Ok(paths.iter().map(|p| CatalogEntry::new(*p)).collect()))),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Err(BridgeError::NotAvailable(
                "media index".to_string(),
            )))),
        })
    }
}

#[async_trait]
impl MediaCatalog for FakeCatalog {
    async fn query_images(&self) -> BridgeResult<Vec<CatalogEntry>> {
        match self.result.lock().take() {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn walk_engine(fs: &Arc<FakeFs>, clock: &Arc<TestClock>, event_bus: EventBus) -> DiscoveryEngine {
    let strategies: Vec<Arc<dyn DiscoveryStrategy>> =
        vec![Arc::new(WalkStrategy::new(fs.clone(), 3))];
    DiscoveryEngine::with_strategies(strategies, clock.clone(), ScanSettings::default(), event_bus)
}

fn dirs(paths: &[&str]) -> Vec<SourceDirectory> {
    paths.iter().map(|p| SourceDirectory::new(*p)).collect()
}

fn paths(files: &[core_discovery::LocalFileRef]) -> Vec<&str> {
    files.iter().map(|f| f.path()).collect()
}

fn camera_roll() -> Arc<FakeFs> {
    FakeFs::new()
        .file("DCIM/Camera/IMG_0001.jpg")
        .file("DCIM/Camera/IMG_0002.HEIC")
        .file("DCIM/Camera/notes.txt")
        .untyped_file("DCIM/Camera/.nomedia")
        .file("DCIM/Camera/Burst/IMG_0003.png")
        .file("DCIM/Camera/VID_0001.mp4")
}

// ============================================================================
// Walk
// ============================================================================

#[tokio::test]
async fn test_walk_finds_photos_recursively() {
    let fs = camera_roll();
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();

    assert_eq!(outcome.source, ScanSource::Strategy(WalkStrategy::NAME));
    assert!(!outcome.cancelled);
    assert_eq!(
        paths(&outcome.files),
        vec![
            "DCIM/Camera/IMG_0001.jpg",
            "DCIM/Camera/IMG_0002.HEIC",
            "DCIM/Camera/Burst/IMG_0003.png",
        ]
    );
    // every non-photo entry gets a list attempt, whatever its hint
    assert!(fs.list_calls().contains(&"DCIM/Camera/.nomedia".to_string()));
    assert!(fs.list_calls().contains(&"DCIM/Camera/notes.txt".to_string()));
}

#[tokio::test]
async fn test_empty_source_list_uses_default_directory() {
    let fs = camera_roll();
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&[], false).await.unwrap();

    assert_eq!(outcome.files.len(), 3);
    assert_eq!(fs.list_calls()[0], "DCIM/Camera");
}

#[tokio::test]
async fn test_depth_limit() {
    let fs = FakeFs::new()
        .file("root/l1/l2/l3/deep.jpg")
        .file("root/l1/l2/l3/l4/deeper.jpg")
        .file("root/top.jpg");
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&dirs(&["root"]), false).await.unwrap();

    assert_eq!(paths(&outcome.files), vec!["root/l1/l2/l3/deep.jpg", "root/top.jpg"]);
    assert!(fs.list_calls().contains(&"root/l1/l2/l3".to_string()));
    assert!(!fs.list_calls().contains(&"root/l1/l2/l3/l4".to_string()));
}

#[tokio::test]
async fn test_duplicate_directories_yield_unique_paths() {
    let fs = camera_roll();
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine
        .scan(&dirs(&["/DCIM/Camera", "DCIM/Camera/", "DCIM"]), false)
        .await
        .unwrap();

    let unique: HashSet<_> = outcome.files.iter().collect();
    assert_eq!(unique.len(), outcome.files.len());
    assert_eq!(outcome.files.len(), 3);
}

#[tokio::test]
async fn test_unconfirmed_photos_accepted_outside_reserved_paths() {
    let fs = FakeFs::new()
        .unstattable("DCIM/locked.jpg")
        .unstattable("Android/data/com.app/cache.jpg")
        .file("DCIM/ok.png");
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&dirs(&["/"]), false).await.unwrap();

    assert_eq!(paths(&outcome.files), vec!["DCIM/locked.jpg", "DCIM/ok.png"]);
}

#[tokio::test]
async fn test_photo_named_directory_is_walked() {
    let fs = FakeFs::new()
        .dir("Pictures/holiday.jpg")
        .file("Pictures/holiday.jpg/inside.jpg");
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&dirs(&["Pictures"]), false).await.unwrap();

    assert_eq!(paths(&outcome.files), vec!["Pictures/holiday.jpg/inside.jpg"]);
}

#[tokio::test]
async fn test_directory_hinted_as_file_is_walked() {
    let fs = FakeFs::new()
        .file("DCIM/Camera/a.jpg")
        .mislabelled_dir("DCIM/Camera/Burst")
        .file("DCIM/Camera/Burst/b.jpg");
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    let outcome = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();

    assert_eq!(
        paths(&outcome.files),
        vec!["DCIM/Camera/a.jpg", "DCIM/Camera/Burst/b.jpg"]
    );
    assert!(fs.list_calls().contains(&"DCIM/Camera/Burst".to_string()));
}

#[tokio::test]
async fn test_unreadable_directory_is_skipped() {
    let fs = camera_roll();
    let event_bus = EventBus::default();
    let mut events = event_bus.subscribe();
    let engine = walk_engine(&fs, &TestClock::new(), event_bus);

    let outcome = engine
        .scan(&dirs(&["/missing", "/DCIM/Camera"]), false)
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 3);
    assert!(engine
        .diagnostics()
        .iter()
        .any(|entry| entry.message.contains("/missing")));

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Discovery(DiscoveryEvent::DirectoryFailed { directory, .. }) = event {
            assert_eq!(directory, "/missing");
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_cache_serves_identical_request_within_ttl() {
    let fs = camera_roll();
    let clock = TestClock::new();
    let engine = walk_engine(&fs, &clock, EventBus::default());
    let sources = dirs(&["/DCIM/Camera"]);

    let first = engine.scan(&sources, false).await.unwrap();
    fs.reset_calls();

    clock.advance(29);
    let second = engine.scan(&sources, false).await.unwrap();
    assert_eq!(second.source, ScanSource::Cache);
    assert_eq!(second.files, first.files);
    assert!(fs.list_calls().is_empty());
    assert!(engine
        .diagnostics()
        .iter()
        .any(|entry| entry.message == "Served 3 files from cache"));

    clock.advance(2);
    let third = engine.scan(&sources, false).await.unwrap();
    assert_eq!(third.source, ScanSource::Strategy(WalkStrategy::NAME));
    assert!(!fs.list_calls().is_empty());
}

#[tokio::test]
async fn test_force_rescan_bypasses_cache() {
    let fs = camera_roll();
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());
    let sources = dirs(&["/DCIM/Camera"]);

    engine.scan(&sources, false).await.unwrap();
    fs.reset_calls();

    let outcome = engine.scan(&sources, true).await.unwrap();
    assert_eq!(outcome.source, ScanSource::Strategy(WalkStrategy::NAME));
    assert!(!fs.list_calls().is_empty());
}

#[tokio::test]
async fn test_reordered_directories_miss_cache() {
    let fs = camera_roll().file("Pictures/a.jpg");
    let engine = walk_engine(&fs, &TestClock::new(), EventBus::default());

    engine.scan(&dirs(&["/DCIM/Camera", "/Pictures"]), false).await.unwrap();
    fs.reset_calls();

    let outcome = engine
        .scan(&dirs(&["/Pictures", "/DCIM/Camera"]), false)
        .await
        .unwrap();
    assert_ne!(outcome.source, ScanSource::Cache);
    assert_eq!(fs.list_calls()[0], "Pictures");

    let cached = engine.cached().unwrap();
    assert_eq!(cached.directories, dirs(&["/Pictures", "/DCIM/Camera"]));
}

// ============================================================================
// Catalog
// ============================================================================

fn catalog_engine(
    fs: &Arc<FakeFs>,
    catalog: Arc<FakeCatalog>,
) -> DiscoveryEngine {
    let strategies: Vec<Arc<dyn DiscoveryStrategy>> = vec![
        Arc::new(CatalogStrategy::new(catalog)),
        Arc::new(WalkStrategy::new(fs.clone(), 3)),
    ];
    DiscoveryEngine::with_strategies(
        strategies,
        TestClock::new(),
        ScanSettings::default(),
        EventBus::default(),
    )
}

#[tokio::test]
async fn test_catalog_preferred_when_it_matches() {
    let fs = camera_roll();
    let catalog = FakeCatalog::with_paths(&[
        "/storage/emulated/0/DCIM/Camera/IMG_9.jpg",
        "/storage/emulated/0/dcim/camera/IMG_10.jpg",
        "/storage/emulated/0/Download/meme.png",
    ]);
    let engine = catalog_engine(&fs, catalog);

    let outcome = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();

    assert_eq!(outcome.source, ScanSource::Strategy(CatalogStrategy::NAME));
    assert_eq!(
        paths(&outcome.files),
        vec![
            "/storage/emulated/0/DCIM/Camera/IMG_9.jpg",
            "/storage/emulated/0/dcim/camera/IMG_10.jpg",
        ]
    );
    assert!(fs.list_calls().is_empty());
}

#[tokio::test]
async fn test_catalog_without_matches_falls_back_to_walk() {
    let fs = camera_roll();
    let engine = catalog_engine(&fs, FakeCatalog::with_paths(&["/sdcard/Download/a.jpg"]));

    let outcome = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();

    assert_eq!(outcome.source, ScanSource::Strategy(WalkStrategy::NAME));
    assert_eq!(outcome.files.len(), 3);
}

#[tokio::test]
async fn test_catalog_failure_falls_back_to_walk() {
    let fs = camera_roll();
    let engine = catalog_engine(&fs, FakeCatalog::failing());

    let outcome = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();

    assert_eq!(outcome.source, ScanSource::Strategy(WalkStrategy::NAME));
    assert_eq!(outcome.files.len(), 3);
    assert!(engine
        .diagnostics()
        .iter()
        .any(|entry| entry.message.contains("catalog failed")));
}

// ============================================================================
// Concurrency and cancellation
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_returns_partial_result_without_caching() {
    let fs = FakeFs::new()
        .file("DCIM/Camera/a.jpg")
        .file("DCIM/Camera/b.jpg")
        .file("DCIM/Camera/slow/c.jpg")
        .file("DCIM/Camera/d.jpg");
    let (reached, release) = fs.gate("DCIM/Camera/slow");
    let engine = Arc::new(walk_engine(&fs, &TestClock::new(), EventBus::default()));

    let scanning = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.scan(&dirs(&["/DCIM/Camera"]), false).await })
    };

    reached.notified().await;
    assert!(engine.is_scanning());
    assert!(engine.cancel());
    release.notify_one();

    let outcome = scanning.await.unwrap().unwrap();
    assert!(outcome.cancelled);
    assert_eq!(paths(&outcome.files), vec!["DCIM/Camera/a.jpg", "DCIM/Camera/b.jpg"]);
    assert!(engine.cached().is_none());
    assert!(!engine.is_scanning());
    assert!(!engine.cancel());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_scan_is_skipped() {
    let fs = camera_roll();
    let (reached, release) = fs.gate("DCIM/Camera/Burst");
    let engine = Arc::new(walk_engine(&fs, &TestClock::new(), EventBus::default()));

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.scan(&dirs(&["/DCIM/Camera"]), false).await })
    };

    reached.notified().await;
    let second = engine.scan(&dirs(&["/DCIM/Camera"]), false).await.unwrap();
    assert_eq!(second.source, ScanSource::Skipped);
    assert!(second.files.is_empty());

    release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.files.len(), 3);
}

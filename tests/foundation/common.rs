//! Shared fixtures.

use keystone::{CacheSource, TransactionManager};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const PAGE_SIZE: usize = 16;

/// Error returned for pages that were never allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoSuchPage(pub u64);

impl std::fmt::Display for NoSuchPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no such page: {}", self.0)
    }
}

impl std::error::Error for NoSuchPage {}

/// In-memory page, mutated by holders and written back on eviction
pub struct Page {
    pub number: u64,
    pub data: Mutex<Vec<u8>>,
}

/// Backing "disk" of fixed-size pages
#[derive(Default)]
pub struct PageStore {
    pub disk: Mutex<HashMap<u64, Vec<u8>>>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl PageStore {
    pub fn with_pages(count: u64) -> Self {
        let store = PageStore::default();
        {
            let mut disk = store.disk.lock();
            for number in 0..count {
                disk.insert(number, vec![0u8; PAGE_SIZE]);
            }
        }
        store
    }

    pub fn on_disk(&self, number: u64) -> Vec<u8> {
        self.disk.lock().get(&number).cloned().unwrap_or_default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CacheSource for PageStore {
    type Value = Page;
    type Error = NoSuchPage;

    fn load(&self, key: u64) -> Result<Page, NoSuchPage> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let data = self.disk.lock().get(&key).cloned().ok_or(NoSuchPage(key))?;
        Ok(Page {
            number: key,
            data: Mutex::new(data),
        })
    }

    fn evict(&self, page: Arc<Page>) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let data = page.data.lock().clone();
        self.disk.lock().insert(page.number, data);
    }
}

/// Scratch directory holding a fresh XID file
pub struct TestXidFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestXidFile {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = keystone::xid_file_path(dir.path().join("db"));
        TestXidFile { dir, path }
    }

    pub fn create(&self) -> TransactionManager {
        TransactionManager::create(&self.path)
    }

    pub fn open(&self) -> TransactionManager {
        TransactionManager::open(&self.path)
    }

    pub fn len(&self) -> u64 {
        std::fs::metadata(&self.path).expect("metadata").len()
    }
}

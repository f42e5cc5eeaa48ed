//! In-memory backend.
//!
//! ## Architecture
//! - Entries live in an `FxHashMap<String, String>` behind a `parking_lot::RwLock`.
//! - Backend operations take `&self`; the lock provides interior mutability so
//!   one store can be shared (`&MemoryBackend`, `Arc<MemoryBackend>`) by
//!   several structures under different namespaces.
//! - Operation counters are tracked with atomics.
//!
//! ## Core Operations
//! - `get`: fetch by key (counts hits/misses).
//! - `set`: insert or overwrite.
//! - `remove`: delete by key.
//! - `clear`: drop all entries.
//!
//! ## Example Usage
//! ```rust
//! use heapcache::store::{Backend, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! backend.set("tmp|l", "0");
//! assert_eq!(backend.get("tmp|l").as_deref(), Some("0"));
//! backend.remove("tmp|l");
//! assert!(backend.is_empty());
//! ```
//!
//! ## Thread Safety
//! - `MemoryBackend` is `Send + Sync`, but the structures layered on it do not
//!   coordinate: a multi-key mutation is not atomic.
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::store::traits::Backend;

/// Snapshot of backend-level operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendMetrics {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub removes: u64,
    pub clears: u64,
}

/// Backend counters, updated through `&self`.
#[derive(Debug, Default)]
struct BackendCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    clears: AtomicU64,
}

impl BackendCounters {
    /// Snapshot current counters.
    fn snapshot(&self) -> BackendMetrics {
        BackendMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }

    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Volatile `FxHashMap`-backed store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    map: RwLock<FxHashMap<String, String>>,
    counters: BackendCounters,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            counters: BackendCounters::default(),
        }
    }

    /// Number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Sorted list of every key currently stored.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.map.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .map
            .read()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Snapshot the store's operation counters.
    pub fn metrics(&self) -> BackendMetrics {
        self.counters.snapshot()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        match self.map.read().get(key).cloned() {
            Some(value) => {
                BackendCounters::inc(&self.counters.hits);
                Some(value)
            },
            None => {
                BackendCounters::inc(&self.counters.misses);
                None
            },
        }
    }

    fn set(&self, key: &str, value: &str) {
        BackendCounters::inc(&self.counters.writes);
        self.map.write().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        BackendCounters::inc(&self.counters.removes);
        self.map.write().remove(key);
    }

    fn clear(&self) {
        BackendCounters::inc(&self.counters.clears);
        self.map.write().clear();
    }

    fn contains_key(&self, key: &str) -> bool {
        self.map.read().contains_key(key)
    }
}

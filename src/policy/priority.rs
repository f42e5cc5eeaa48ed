//! # Priority Cache
//!
//! A fixed-capacity cache persisted into a [`Backend`] that evicts the entry
//! with the globally lowest priority whenever an insert pushes it over
//! capacity. All state lives in one [`IndexedHeap`]; the cache adds the
//! capacity bound and the eviction rule.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                      PriorityCache<B, D, P>                              │
//!   │                                                                          │
//!   │   capacity: usize            (immutable, > 0)                            │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  heap: IndexedHeap<B, D, P>   (namespace "tmp")                    │ │
//!   │   │                                                                    │ │
//!   │   │   tmp|i|0  {"d":..,"k":"key7","p":3}   ← next victim (min p)       │ │
//!   │   │   tmp|i|1  {"d":..,"k":42,"p":100}                                 │ │
//!   │   │   ...                                                              │ │
//!   │   │   tmp|d|key7 = "0"    tmp|d|42 = "1"   ...                         │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//!
//!   add_item(k, d, p):
//!     1. heap.push({k, d, p})          DuplicateKey if k is live
//!     2. while len > capacity:
//!          heap.pop()                  evict global minimum
//! ```
//!
//! ## Core Operations
//!
//! | Method           | Complexity | Description                              |
//! |------------------|------------|------------------------------------------|
//! | `new`            | O(1)       | Open cache over a namespace              |
//! | `add_item`       | O(log n)   | Insert, evict minimum if over capacity   |
//! | `get_item`       | O(1)       | Data stored under a key                  |
//! | `update_item`    | O(log n)   | Replace data and priority, never evicts  |
//! | `remove_item`    | O(log n)   | Delete if present (absent is a no-op)    |
//! | `clear`          | O(n)       | Remove every entry, keep capacity        |
//! | `key_from_url`   | O(m log m) | Stable key from URL + parameters         |
//!
//! ## Example Usage
//!
//! ```
//! use heapcache::policy::priority::PriorityCache;
//! use heapcache::store::MemoryBackend;
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//! let mut cache: PriorityCache<_> = PriorityCache::new(&backend, "tmp", 2).unwrap();
//!
//! cache.add_item("low", json!("a"), 1.0).unwrap();
//! cache.add_item("high", json!("b"), 9.0).unwrap();
//!
//! // Third insert evicts the lowest priority
//! let evicted = cache.add_item("mid", json!("c"), 5.0).unwrap();
//! assert_eq!(evicted.len(), 1);
//! assert_eq!(cache.get_item("low").unwrap(), None);
//! assert_eq!(cache.get_item("high").unwrap(), Some(json!("b")));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe. Designed for sequential use by one logical actor per
//! namespace.
use std::fmt;
use std::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ds::{IndexedHeap, Item, ItemKey, Moved};
use crate::error::{ConfigError, InvariantError, Result};
use crate::fingerprint;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::PriorityMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::PriorityMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, PriorityMetricsReadRecorder,
    PriorityMetricsRecorder,
};
use crate::store::Backend;

/// Capacity-bounded cache evicting the lowest-priority entry.
///
/// # Type Parameters
///
/// - `B`: Backend handle
/// - `D`: Cached data (defaults to `serde_json::Value`)
/// - `P`: Priority (defaults to `f64`); lowest is evicted first
pub struct PriorityCache<B, D = serde_json::Value, P = f64> {
    heap: IndexedHeap<B, D, P>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: PriorityMetrics,
}

impl<B, D, P> fmt::Debug for PriorityCache<B, D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityCache")
            .field("heap", &self.heap)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<B, D, P> PriorityCache<B, D, P>
where
    B: Backend,
    D: Serialize + DeserializeOwned,
    P: PartialOrd + Serialize + DeserializeOwned,
{
    /// Opens a cache of at most `capacity` entries under `namespace`.
    ///
    /// Entries already persisted under the namespace are kept as-is, even if
    /// they exceed `capacity`; the next `add_item` evicts down to the bound.
    pub fn new(
        backend: B,
        namespace: impl Into<String>,
        capacity: usize,
    ) -> std::result::Result<Self, ConfigError> {
        let namespace = namespace.into();
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if namespace.is_empty() {
            return Err(ConfigError::new("namespace must not be empty"));
        }
        debug!(%namespace, capacity, "opening priority cache");
        Ok(Self {
            heap: IndexedHeap::new(backend, namespace),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: PriorityMetrics::default(),
        })
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the namespace the cache persists under.
    pub fn namespace(&self) -> &str {
        self.heap.namespace()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> Result<usize> {
        self.heap.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        self.heap.is_empty()
    }

    /// Inserts a new entry, evicting lowest-priority entries while the cache
    /// is over capacity. Returns the evicted items (normally zero or one).
    ///
    /// Returns [`Error::DuplicateKey`](crate::error::Error::DuplicateKey) if
    /// `key` is already cached, or
    /// [`Error::Serialization`](crate::error::Error::Serialization) if the
    /// entry cannot be stored losslessly (a non-finite `f64` priority).
    /// Nothing is written in either case.
    pub fn add_item(
        &mut self,
        key: impl Into<ItemKey>,
        data: D,
        priority: P,
    ) -> Result<Vec<Item<D, P>>> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let pushed = self.heap.push(Item::new(key, data, priority));
        #[cfg(feature = "metrics")]
        if pushed.is_err() {
            self.metrics.record_insert_rejected();
        }
        pushed?;

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let mut evicted = Vec::new();
        let mut len = self.heap.len()?;
        if len > self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();
        }
        while len > self.capacity {
            let victim = self.heap.pop()?;
            debug!(
                namespace = self.heap.namespace(),
                key = %victim.key,
                "evicted lowest-priority entry"
            );
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
            evicted.push(victim);
            len -= 1;
        }
        Ok(evicted)
    }

    /// Returns the data cached under `key`, if present.
    pub fn get_item(&self, key: impl Into<ItemKey>) -> Result<Option<D>> {
        let found = self.heap.get_item(key)?.map(|item| item.data);
        #[cfg(feature = "metrics")]
        if found.is_some() {
            (&self.metrics).record_get_hit();
        } else {
            (&self.metrics).record_get_miss();
        }
        Ok(found)
    }

    /// Returns `true` if `key` is cached.
    pub fn contains_key(&self, key: impl Into<ItemKey>) -> bool {
        self.heap.contains_key(key)
    }

    /// Returns the current lowest-priority entry (the next eviction victim).
    pub fn peek_lowest(&self) -> Result<Option<Item<D, P>>> {
        self.heap.peek()
    }

    /// Replaces the data and priority of a cached entry.
    ///
    /// Never evicts. Returns
    /// [`Error::UnknownKey`](crate::error::Error::UnknownKey) if `key` is not
    /// cached.
    pub fn update_item(&mut self, key: impl Into<ItemKey>, data: D, priority: P) -> Result<Moved> {
        #[cfg(feature = "metrics")]
        self.metrics.record_update_call();

        let moved = self.heap.update_item(Item::new(key, data, priority))?;

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_update_found();
            if moved != Moved::NotMoved {
                self.metrics.record_update_moved();
            }
        }
        Ok(moved)
    }

    /// Removes `key` and returns its data. Removing an absent key is a no-op
    /// that returns `None`.
    pub fn remove_item(&mut self, key: impl Into<ItemKey>) -> Result<Option<D>> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let key = key.into();
        if !self.heap.contains_key(&key) {
            return Ok(None);
        }
        let (removed, _) = self.heap.remove_item(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();
        Ok(Some(removed.data))
    }

    /// Removes every entry. The capacity is retained.
    pub fn clear(&mut self) -> Result<()> {
        self.heap.clear()?;
        debug!(namespace = self.heap.namespace(), "cleared priority cache");
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        Ok(())
    }

    /// Derives a cache key from `url` and `params`; see
    /// [`fingerprint::key_from_url`].
    pub fn key_from_url<I, K, V>(&self, url: &str, params: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        fingerprint::key_from_url(url, params)
    }

    /// Verifies the heap invariants and the capacity bound.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        self.heap.check_invariants()?;
        let len = self.heap.len()?;
        if len > self.capacity {
            return Err(InvariantError::new(format!(
                "len {len} exceeds capacity {}",
                self.capacity
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<B, D, P> PriorityCache<B, D, P>
where
    B: Backend,
    D: Serialize + DeserializeOwned,
    P: PartialOrd + Serialize + DeserializeOwned,
{
    /// Snapshot of the operation counters.
    pub fn metrics(&self) -> PriorityMetricsSnapshot {
        self.snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<B, D, P> MetricsSnapshotProvider<PriorityMetricsSnapshot> for PriorityCache<B, D, P>
where
    B: Backend,
    D: Serialize + DeserializeOwned,
    P: PartialOrd + Serialize + DeserializeOwned,
{
    fn snapshot(&self) -> PriorityMetricsSnapshot {
        // An unreadable length reports as 0; the counters are still valid.
        let len = self.heap.len().unwrap_or(0);
        self.metrics.snapshot_with(len, self.capacity)
    }
}

//! Builder and configuration for [`PriorityCache`].
//!
//! [`CacheConfig`] is plain serializable data, so a cache can be described in
//! a config file and opened later over any [`Backend`].
//!
//! ## Example
//!
//! ```rust
//! use heapcache::builder::CacheBuilder;
//! use heapcache::store::{Backend, MemoryBackend};
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//! let mut cache = CacheBuilder::new(100)
//!     .namespace("pages")
//!     .try_build::<_, serde_json::Value>(&backend)
//!     .unwrap();
//! cache.add_item("home", json!("<html>"), 3.0).unwrap();
//! assert!(backend.contains_key("pages|d|home"));
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::priority::PriorityCache;
use crate::store::Backend;

/// Serializable description of a cache.
///
/// Missing fields fall back to [`CacheConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend key prefix for every entry of the cache.
    pub namespace: String,

    /// Maximum number of entries the cache can hold.
    pub capacity: usize,
}

impl Default for CacheConfig {
    /// Defaults:
    /// - `namespace`: `"cache"`
    /// - `capacity`: 1000
    fn default() -> Self {
        Self {
            namespace: "cache".to_owned(),
            capacity: 1000,
        }
    }
}

impl CacheConfig {
    /// Checks the values a cache would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::new("namespace must not be empty"));
        }
        Ok(())
    }
}

/// Builder for [`PriorityCache`] instances.
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity and the default
    /// namespace.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: CacheConfig {
                capacity,
                ..CacheConfig::default()
            },
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Set the backend key prefix.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Open the cache over `backend`.
    ///
    /// # Type Parameters
    ///
    /// - `B`: Backend handle, e.g. `&MemoryBackend` or `Arc<MemoryBackend>`
    /// - `D`: Cached data type
    pub fn try_build<B, D>(self, backend: B) -> Result<PriorityCache<B, D>, ConfigError>
    where
        B: Backend,
        D: Serialize + DeserializeOwned,
    {
        self.config.validate()?;
        PriorityCache::new(backend, self.config.namespace, self.config.capacity)
    }
}

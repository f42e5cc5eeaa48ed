pub use crate::builder::{CacheBuilder, CacheConfig};
pub use crate::ds::{IndexedHeap, Item, ItemKey, Moved, PersistentSequence};
pub use crate::error::{ConfigError, Error, InvariantError, Result};
pub use crate::fingerprint::key_from_url;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::PriorityMetricsSnapshot;
pub use crate::policy::priority::PriorityCache;
pub use crate::store::{Backend, MemoryBackend};

//! Storage backends for the persistent structures.
//!
//! Backends only own strings under exact keys; the structures in
//! [`ds`](crate::ds) decide the key layout ([`keys`]) and the encoding. This
//! keeps heap and cache logic independent of where the strings end up.

pub mod keys;
pub mod memory;
pub mod traits;

pub use memory::{BackendMetrics, MemoryBackend};
pub use traits::Backend;

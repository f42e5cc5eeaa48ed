//! heapcache: a capacity-bounded priority cache persisted into a flat string
//! key-value store.
//!
//! Layers, leaves first: [`store`] (backend contract and key layout),
//! [`ds`] (persistent sequence and indexed min-heap), [`policy`] (the
//! evicting cache) and [`builder`] (configuration).

pub mod builder;
pub mod ds;
pub mod error;
pub mod fingerprint;
pub mod policy;
pub mod store;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

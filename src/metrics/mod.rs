//! Operation counters for [`PriorityCache`](crate::policy::priority::PriorityCache).
//!
//! Enabled with the `metrics` feature. Recorders write counters, snapshot
//! providers read them; the cache itself never branches on a counter.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and resetting are split into small traits so the
//! cache only writes counters and tests/benches only read them.
//!
//! ```text
//!            ┌─────────────────────────────┐
//!            │     CoreMetricsRecorder     │
//!            │  insert/evict/clear (&mut)  │
//!            └──────────────┬──────────────┘
//!                           │
//!                           ▼
//!            ┌─────────────────────────────┐      ┌─────────────────────────────┐
//!            │   PriorityMetricsRecorder   │      │ PriorityMetricsReadRecorder │
//!            │  update/remove (&mut)       │      │  get hit/miss (&self)       │
//!            └─────────────────────────────┘      └─────────────────────────────┘
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters shared by any cache.
pub trait CoreMetricsRecorder {
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_rejected(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Counters specific to the priority cache's mutating operations.
pub trait PriorityMetricsRecorder: CoreMetricsRecorder {
    fn record_update_call(&mut self);
    fn record_update_found(&mut self);
    fn record_update_moved(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
}

/// Read-path counters for `&self` methods (uses interior mutability).
pub trait PriorityMetricsReadRecorder {
    fn record_get_hit(&self);
    fn record_get_miss(&self);
}

/// Produce a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset counters between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

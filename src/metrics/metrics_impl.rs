use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::PriorityMetricsSnapshot;
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsReset, PriorityMetricsReadRecorder, PriorityMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct PriorityMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub update_calls: u64,
    pub update_found: u64,
    pub update_moved: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub clear_calls: u64,
}

impl PriorityMetrics {
    pub fn new() -> PriorityMetrics {
        Self::default()
    }

    /// Copy the counters, adding the gauges supplied by the cache.
    pub fn snapshot_with(&self, cache_len: usize, capacity: usize) -> PriorityMetricsSnapshot {
        PriorityMetricsSnapshot {
            get_calls: self.get_calls.get(),
            get_hits: self.get_hits.get(),
            get_misses: self.get_misses.get(),
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_rejected: self.insert_rejected,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            update_calls: self.update_calls,
            update_found: self.update_found,
            update_moved: self.update_moved,
            remove_calls: self.remove_calls,
            remove_found: self.remove_found,
            clear_calls: self.clear_calls,
            cache_len,
            capacity,
        }
    }
}

impl CoreMetricsRecorder for PriorityMetrics {
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl PriorityMetricsRecorder for PriorityMetrics {
    fn record_update_call(&mut self) {
        self.update_calls += 1;
    }

    fn record_update_found(&mut self) {
        self.update_found += 1;
    }

    fn record_update_moved(&mut self) {
        self.update_moved += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }
}

impl PriorityMetricsReadRecorder for &PriorityMetrics {
    fn record_get_hit(&self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_get_miss(&self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }
}

impl MetricsReset for PriorityMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PriorityMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_rejected: u64, // duplicate keys

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub update_calls: u64,
    pub update_found: u64,
    pub update_moved: u64, // updates whose sift changed the slot

    pub remove_calls: u64,
    pub remove_found: u64,

    pub clear_calls: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl PriorityMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#![no_main]

use heapcache::policy::priority::PriorityCache;
use heapcache::store::MemoryBackend;
use libfuzzer_sys::fuzz_target;
use serde_json::json;

// Fuzz eviction under arbitrary insert streams
//
// The first byte picks the capacity; each following pair is (key, priority).
// Every evicted entry must be no greater than anything left resident.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, rest)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 16) + 1;

    let backend = MemoryBackend::new();
    let mut cache: PriorityCache<_, serde_json::Value, u8> =
        PriorityCache::new(&backend, "fuzz", capacity).unwrap();

    for pair in rest.chunks_exact(2) {
        let key = u32::from(pair[0]);
        let priority = pair[1];

        if cache.contains_key(key) {
            assert!(cache.add_item(key, json!(priority), priority).is_err());
            continue;
        }

        let evicted = cache.add_item(key, json!(priority), priority).unwrap();
        assert!(evicted.len() <= 1);
        if let Some(victim) = evicted.first() {
            assert!(!cache.contains_key(&victim.key));
            let lowest = cache.peek_lowest().unwrap().unwrap();
            assert!(victim.priority <= lowest.priority);
        }
        assert!(cache.len().unwrap() <= capacity);
        cache.check_invariants().unwrap();
    }
});

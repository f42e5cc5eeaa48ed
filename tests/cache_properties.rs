// ==============================================
// PRIORITY CACHE PROPERTY TESTS (integration)
// ==============================================

use std::collections::BTreeMap;

use heapcache::error::Error;
use heapcache::policy::priority::PriorityCache;
use heapcache::store::MemoryBackend;
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    Add(u8, u16),
    Update(u8, u16),
    Remove(u8),
    Get(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..48, any::<u16>()).prop_map(|(k, p)| Op::Add(k, p)),
        2 => (0u8..48, any::<u16>()).prop_map(|(k, p)| Op::Update(k, p)),
        1 => (0u8..48).prop_map(Op::Remove),
        2 => (0u8..48).prop_map(Op::Get),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_capacity_and_membership_match_model(
        capacity in 1usize..12,
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let backend = MemoryBackend::new();
        let mut cache: PriorityCache<_, serde_json::Value, u16> =
            PriorityCache::new(&backend, "prop", capacity).unwrap();
        // key -> (priority, data)
        let mut model: BTreeMap<u8, (u16, u64)> = BTreeMap::new();
        let mut stamp = 0u64;

        for op in ops {
            stamp += 1;
            match op {
                Op::Add(k, p) => {
                    let result = cache.add_item(u32::from(k), json!(stamp), p);
                    if model.contains_key(&k) {
                        prop_assert!(matches!(result, Err(Error::DuplicateKey(_))));
                        continue;
                    }
                    let evicted = result.unwrap();
                    model.insert(k, (p, stamp));
                    for item in evicted {
                        let min = model.values().map(|(p, _)| *p).min().unwrap();
                        prop_assert_eq!(item.priority, min);
                        let key: u8 = item.key.to_string().parse().unwrap();
                        prop_assert_eq!(model.remove(&key).map(|(p, _)| p), Some(item.priority));
                    }
                    prop_assert!(model.len() <= capacity);
                },
                Op::Update(k, p) => {
                    let result = cache.update_item(u32::from(k), json!(stamp), p);
                    if let Some(entry) = model.get_mut(&k) {
                        prop_assert!(result.is_ok());
                        *entry = (p, stamp);
                    } else {
                        prop_assert!(matches!(result, Err(Error::UnknownKey(_))));
                    }
                },
                Op::Remove(k) => {
                    let removed = cache.remove_item(u32::from(k)).unwrap();
                    prop_assert_eq!(removed, model.remove(&k).map(|(_, d)| json!(d)));
                },
                Op::Get(k) => {
                    let got = cache.get_item(u32::from(k)).unwrap();
                    prop_assert_eq!(got, model.get(&k).map(|(_, d)| json!(d)));
                },
            }
            prop_assert_eq!(cache.len().unwrap(), model.len());
            prop_assert!(cache.check_invariants().is_ok());
        }
    }
}

#![no_main]

use heapcache::ds::{IndexedHeap, Item, Moved};
use heapcache::error::Error;
use heapcache::store::MemoryBackend;
use libfuzzer_sys::fuzz_target;
use serde_json::json;

// Fuzz arbitrary operation sequences on IndexedHeap
//
// Tests random sequences of push, pop, update, remove, swap and peek, checking
// the heap property and index consistency after every step.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let backend = MemoryBackend::new();
    let mut heap: IndexedHeap<_, u8, u8> = IndexedHeap::new(&backend, "fuzz");

    let mut idx = 0;
    while idx + 2 < data.len() {
        let op = data[idx] % 6;
        let key = u32::from(data[idx + 1] % 32);
        let priority = data[idx + 2];

        match op {
            0 => {
                // push
                let present = heap.contains_key(key);
                let old_len = heap.len().unwrap();
                match heap.push(Item::new(key, priority, priority)) {
                    Ok(()) => {
                        assert!(!present);
                        assert_eq!(heap.len().unwrap(), old_len + 1);
                    },
                    Err(Error::DuplicateKey(_)) => {
                        assert!(present);
                        assert_eq!(heap.len().unwrap(), old_len);
                    },
                    Err(e) => panic!("unexpected push error: {e}"),
                }
            },
            1 => {
                // pop
                let old_len = heap.len().unwrap();
                let min = heap.peek().unwrap();
                match heap.pop() {
                    Ok(item) => {
                        assert_eq!(Some(item.priority), min.map(|m| m.priority));
                        assert_eq!(heap.len().unwrap(), old_len - 1);
                        assert!(!heap.contains_key(&item.key));
                    },
                    Err(Error::EmptyContainer) => assert_eq!(old_len, 0),
                    Err(e) => panic!("unexpected pop error: {e}"),
                }
            },
            2 => {
                // update
                let present = heap.contains_key(key);
                match heap.update_item(Item::new(key, priority, priority)) {
                    Ok(moved) => {
                        assert!(present);
                        let pos = heap.position_of(key).unwrap();
                        if let Moved::MovedTo(to) = moved {
                            assert_eq!(pos, Some(to));
                        }
                        assert_eq!(heap.get_item(key).unwrap().map(|i| i.data), Some(priority));
                    },
                    Err(Error::UnknownKey(_)) => assert!(!present),
                    Err(e) => panic!("unexpected update error: {e}"),
                }
            },
            3 => {
                // remove
                let old_len = heap.len().unwrap();
                match heap.remove_item(key) {
                    Ok((item, _)) => {
                        assert_eq!(item.key, key.into());
                        assert_eq!(heap.len().unwrap(), old_len - 1);
                        assert!(!heap.contains_key(key));
                    },
                    Err(Error::UnknownKey(_)) => assert_eq!(heap.len().unwrap(), old_len),
                    Err(e) => panic!("unexpected remove error: {e}"),
                }
            },
            4 => {
                // swap then swap back
                let len = heap.len().unwrap();
                if len >= 2 {
                    let i = usize::from(data[idx + 1]) % len;
                    let j = usize::from(data[idx + 2]) % len;
                    heap.swap(i, j).unwrap();
                    heap.swap(i, j).unwrap();
                }
            },
            5 => {
                // peek is the minimum of all items
                if let Some(root) = heap.peek().unwrap() {
                    let items = heap.items().unwrap();
                    assert!(items.iter().all(|i| i.priority >= root.priority));
                }
            },
            _ => unreachable!(),
        }

        heap.check_invariants().unwrap();
        idx += 3;
    }
});

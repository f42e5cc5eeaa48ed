//! Persistent indexed binary min-heap.
//!
//! A priority queue whose backing array lives in a [`PersistentSequence`] and
//! whose entries can be addressed directly by key through a persisted
//! key→position index. Every mutation (push, pop, sift swaps, arbitrary
//! removal) keeps the index in step with the slots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                       IndexedHeap Layout (namespace "tmp")                  │
//! │                                                                             │
//! │   ┌───────────────────────────────────────────────────────────────────┐    │
//! │   │  slots: PersistentSequence under "tmp|i"                          │    │
//! │   │                                                                   │    │
//! │   │    tmp|i|l = "3"                                                  │    │
//! │   │    tmp|i|0 = {"d":42,"k":777,"p":55}       ← root (min priority) │    │
//! │   │    tmp|i|1 = {"d":"test","k":"xxx","p":77}                       │    │
//! │   │    tmp|i|2 = {"d":null,"k":5,"p":60}                             │    │
//! │   │                                                                   │    │
//! │   │    parent(i) = (i - 1) / 2,  children(i) = 2i + 1, 2i + 2         │    │
//! │   └───────────────────────────────────────────────────────────────────┘    │
//! │                                                                             │
//! │   ┌───────────────────────────────────────────────────────────────────┐    │
//! │   │  index: one backend key per live item                             │    │
//! │   │                                                                   │    │
//! │   │    tmp|d|777 = "0"                                                │    │
//! │   │    tmp|d|xxx = "1"                                                │    │
//! │   │    tmp|d|5   = "2"                                                │    │
//! │   └───────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────────┘
//!
//! Remove Flow
//! ───────────
//!   remove_item("xxx"):          position 1, last position 2
//!     1. slot[1] = slot[2]       (item 5 relocated)
//!     2. truncate slots          (tmp|i|2 removed, length 2)
//!     3. index["xxx"] removed
//!     4. index[5] = 1
//!     5. sift up from 1, then sift down if it did not move
//!     6. return MovedTo(final position of item 5)
//! ```
//!
//! ## Invariants
//!
//! - **Heap property**: `priority(parent(i)) <= priority(i)` for every `i > 0`.
//! - **Index consistency**: the index entry of every live key holds its slot
//!   position, and no index entry exists for a key that is not live.
//! - **Key uniqueness**: no two live items share a key.
//!
//! ## Operations
//!
//! | Operation      | Description                                   | Complexity |
//! |----------------|-----------------------------------------------|------------|
//! | `push`         | Append, index, sift up                        | O(log n)   |
//! | `pop`          | Remove root, move last to root, sift down     | O(log n)   |
//! | `peek`         | Read root                                     | O(1)       |
//! | `get_item`     | Index lookup + slot read                      | O(1)       |
//! | `update_item`  | Overwrite slot, sift up or down               | O(log n)   |
//! | `remove_item`  | Move last into the hole, sift up or down      | O(log n)   |
//! | `less`         | Compare priorities at two positions           | O(1)       |
//! | `swap`         | Exchange two slots and their index entries    | O(1)       |
//! | `clear`        | Drop every slot and index entry               | O(n)       |
//!
//! ## Example Usage
//!
//! ```
//! use heapcache::ds::{IndexedHeap, Item, ItemKey, Moved};
//! use heapcache::store::MemoryBackend;
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//! let mut heap: IndexedHeap<_> = IndexedHeap::new(&backend, "tmp");
//!
//! heap.push(Item::new(555, json!(42), 55.0)).unwrap();
//! heap.push(Item::new(777, json!(42), 55.0)).unwrap();
//! heap.push(Item::new("xxx", json!("test"), 77.0)).unwrap();
//!
//! // Lowering 777's priority moves it to the root
//! let moved = heap.update_item(Item::new(777, json!("don't panic"), 42.0)).unwrap();
//! assert_eq!(moved, Moved::MovedTo(0));
//!
//! assert_eq!(heap.pop().unwrap().key, ItemKey::from(777));
//! assert_eq!(heap.len().unwrap(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! `IndexedHeap` is not thread-safe. A sift is a sequence of single-key
//! backend writes; an observer reading mid-sift may see the heap property
//! temporarily violated.
//!
//! ## Implementation Notes
//!
//! - No state is kept in memory besides the namespaces and the backend handle,
//!   so instances opened over the same namespace observe each other's writes.
//! - Comparisons and swaps decode only the `p` / `k` fields of a slot.
//! - Ties never swap: equal priorities keep their positions.
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::ds::item::{Item, ItemKey, Moved, SlotKey, SlotPriority};
use crate::ds::sequence::PersistentSequence;
use crate::error::{Error, InvariantError, Result};
use crate::store::Backend;
use crate::store::keys;

/// Min-priority binary heap persisted in a backend, addressable by key.
///
/// # Type Parameters
///
/// - `B`: Backend handle (`&MemoryBackend`, `Arc<_>`, ...)
/// - `D`: Item data, serialized opaquely (defaults to `serde_json::Value`)
/// - `P`: Priority (defaults to `f64`); smaller pops first
pub struct IndexedHeap<B, D = serde_json::Value, P = f64> {
    slots: PersistentSequence<B>,
    namespace: String,
    index_namespace: String,
    _marker: PhantomData<fn() -> (D, P)>,
}

impl<B, D, P> fmt::Debug for IndexedHeap<B, D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedHeap")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<B, D, P> IndexedHeap<B, D, P>
where
    B: Backend,
    D: Serialize + DeserializeOwned,
    P: PartialOrd + Serialize + DeserializeOwned,
{
    /// Opens the heap stored under `namespace`.
    ///
    /// Whatever is already persisted there is trusted as-is; no validation
    /// pass runs (see [`check_invariants`](Self::check_invariants)).
    pub fn new(backend: B, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let slots_namespace = keys::child_namespace(&namespace, keys::SLOTS_TAG);
        let index_namespace = keys::child_namespace(&namespace, keys::INDEX_TAG);
        Self {
            slots: PersistentSequence::new(backend, slots_namespace),
            namespace,
            index_namespace,
            _marker: PhantomData,
        }
    }

    /// Returns the heap's namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the number of live items.
    pub fn len(&self) -> Result<usize> {
        self.slots.len()
    }

    /// Returns `true` if the heap holds no items.
    pub fn is_empty(&self) -> Result<bool> {
        self.slots.is_empty()
    }

    /// Inserts `item` and restores heap order.
    ///
    /// Returns [`Error::DuplicateKey`] if the key is already live, or
    /// [`Error::Serialization`] if the item would not read back (a non-finite
    /// `f64` priority encodes as `null`). Both checks run before anything is
    /// written.
    pub fn push(&mut self, item: Item<D, P>) -> Result<()> {
        let key = item.key.to_string();
        if self.backend().contains_key(&self.index_key(&key)) {
            return Err(Error::DuplicateKey(key));
        }
        let encoded = encode_slot(&item)?;

        let pos = self.slots.len()?;
        self.slots.push(encoded)?;
        self.write_position(&key, pos);
        let rest = self.sift_up(pos)?;
        trace!(namespace = %self.namespace, %key, pos = rest, "pushed item");
        Ok(())
    }

    /// Removes and returns the minimum-priority item.
    ///
    /// Returns [`Error::EmptyContainer`] if the heap is empty.
    pub fn pop(&mut self) -> Result<Item<D, P>> {
        let len = self.slots.len()?;
        if len == 0 {
            return Err(Error::EmptyContainer);
        }
        let root: Item<D, P> = serde_json::from_str(&self.slots.get_at(0)?)?;
        let root_key = root.key.to_string();

        if len == 1 {
            self.slots.truncate_last()?;
            self.remove_position(&root_key);
            return Ok(root);
        }

        let last_raw = self.slots.get_at(len - 1)?;
        let last_key = decode_key(&last_raw)?;
        self.slots.set_at(0, &last_raw)?;
        self.slots.truncate_last()?;
        self.write_position(&last_key, 0);
        self.remove_position(&root_key);
        self.sift_down(0, len - 1)?;
        Ok(root)
    }

    /// Returns the minimum-priority item without removing it.
    pub fn peek(&self) -> Result<Option<Item<D, P>>> {
        if self.slots.is_empty()? {
            return Ok(None);
        }
        self.read_slot(0).map(Some)
    }

    /// Returns a copy of the item stored under `key`, if present.
    pub fn get_item(&self, key: impl Into<ItemKey>) -> Result<Option<Item<D, P>>> {
        match self.position_of(key)? {
            Some(pos) => self.read_slot(pos).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `true` if `key` is live.
    pub fn contains_key(&self, key: impl Into<ItemKey>) -> bool {
        let key = key.into().to_string();
        self.backend().contains_key(&self.index_key(&key))
    }

    /// Returns the current slot position of `key`, if present.
    pub fn position_of(&self, key: impl Into<ItemKey>) -> Result<Option<usize>> {
        let key = key.into().to_string();
        self.read_position(&key)
    }

    /// Replaces the item with the same key as `item` and restores heap order.
    ///
    /// Returns [`Moved::MovedTo`] with the item's final position if sifting
    /// moved it, or [`Error::UnknownKey`] if the key is not live. An item
    /// that would not read back is rejected before the slot is overwritten.
    pub fn update_item(&mut self, item: Item<D, P>) -> Result<Moved> {
        let key = item.key.to_string();
        let pos = self
            .read_position(&key)?
            .ok_or_else(|| Error::UnknownKey(key.clone()))?;
        let encoded = encode_slot(&item)?;
        self.slots.set_at(pos, encoded)?;

        let len = self.slots.len()?;
        let rest = self.restore(pos, len)?;
        trace!(namespace = %self.namespace, %key, from = pos, to = rest, "updated item");
        Ok(moved_between(pos, rest))
    }

    /// Removes the item stored under `key` and returns it.
    ///
    /// The last item fills the vacated slot and is sifted into place; the
    /// returned [`Moved`] reports where it came to rest. Returns
    /// [`Error::UnknownKey`] if the key is not live.
    pub fn remove_item(&mut self, key: impl Into<ItemKey>) -> Result<(Item<D, P>, Moved)> {
        let key = key.into().to_string();
        let pos = self
            .read_position(&key)?
            .ok_or_else(|| Error::UnknownKey(key.clone()))?;
        let len = self.slots.len()?;
        if pos >= len {
            return Err(Error::corrupt(
                self.index_key(&key),
                format!("index entry {pos} points past heap length {len}"),
            ));
        }
        let removed = self.read_slot(pos)?;
        let last = len - 1;

        if pos == last {
            self.slots.truncate_last()?;
            self.remove_position(&key);
            return Ok((removed, Moved::NotMoved));
        }

        let last_raw = self.slots.get_at(last)?;
        let last_key = decode_key(&last_raw)?;
        self.slots.set_at(pos, &last_raw)?;
        self.slots.truncate_last()?;
        self.remove_position(&key);
        self.write_position(&last_key, pos);

        let rest = self.restore(pos, last)?;
        trace!(namespace = %self.namespace, %key, moved = %last_key, to = rest, "removed item");
        Ok((removed, Moved::MovedTo(rest)))
    }

    /// Returns `true` if the priority at `i` is strictly less than at `j`.
    pub fn less(&self, i: usize, j: usize) -> Result<bool> {
        let pi = self.priority_at(i)?;
        let pj = self.priority_at(j)?;
        Ok(pi < pj)
    }

    /// Exchanges the slots at `i` and `j` and updates both index entries.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        let raw_i = self.slots.get_at(i)?;
        let raw_j = self.slots.get_at(j)?;
        if i == j {
            return Ok(());
        }
        let key_i = decode_key(&raw_i)?;
        let key_j = decode_key(&raw_j)?;
        self.slots.set_at(i, &raw_j)?;
        self.slots.set_at(j, &raw_i)?;
        self.write_position(&key_j, i);
        self.write_position(&key_i, j);
        Ok(())
    }

    /// Removes every item and every index entry.
    pub fn clear(&mut self) -> Result<()> {
        let len = self.slots.len()?;
        for pos in 0..len {
            let key = decode_key(&self.slots.get_at(pos)?)?;
            self.remove_position(&key);
        }
        self.slots.clear()
    }

    /// Returns copies of all items in slot order.
    pub fn items(&self) -> Result<Vec<Item<D, P>>> {
        let len = self.slots.len()?;
        (0..len).map(|pos| self.read_slot(pos)).collect()
    }

    /// Verifies the heap property, index consistency and key uniqueness
    /// against the persisted state.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        let len = self.slots.len()?;
        for pos in 0..len {
            let key = decode_key(&self.slots.get_at(pos)?)?;
            match self.read_position(&key)? {
                Some(indexed) if indexed == pos => {},
                Some(indexed) => {
                    // A second slot with the same key also lands here.
                    return Err(InvariantError::new(format!(
                        "index for `{key}` points to {indexed}, slot is {pos}"
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "no index entry for live key `{key}` at {pos}"
                    )));
                },
            }
            if pos > 0 {
                let parent = (pos - 1) / 2;
                if self.less(pos, parent)? {
                    return Err(InvariantError::new(format!(
                        "heap property violated between {parent} and {pos}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Walks `pos` up while its parent has a strictly greater priority.
    /// Returns the final position.
    fn sift_up(&mut self, mut pos: usize) -> Result<usize> {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent)? {
                break;
            }
            self.swap(pos, parent)?;
            pos = parent;
        }
        Ok(pos)
    }

    /// Walks `pos` down while its smaller child has a strictly smaller
    /// priority. Returns the final position.
    fn sift_down(&mut self, mut pos: usize, len: usize) -> Result<usize> {
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left)? {
                right
            } else {
                left
            };
            if !self.less(child, pos)? {
                break;
            }
            self.swap(pos, child)?;
            pos = child;
        }
        Ok(pos)
    }

    /// Sifts up, and down if that did not move the entry.
    fn restore(&mut self, pos: usize, len: usize) -> Result<usize> {
        let up = self.sift_up(pos)?;
        if up != pos {
            return Ok(up);
        }
        self.sift_down(pos, len)
    }

    fn read_slot(&self, pos: usize) -> Result<Item<D, P>> {
        Ok(serde_json::from_str(&self.slots.get_at(pos)?)?)
    }

    fn priority_at(&self, pos: usize) -> Result<P> {
        let slot: SlotPriority<P> = serde_json::from_str(&self.slots.get_at(pos)?)?;
        Ok(slot.priority)
    }

    fn read_position(&self, key: &str) -> Result<Option<usize>> {
        let index_key = self.index_key(key);
        match self.backend().get(&index_key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<usize>()
                .map(Some)
                .map_err(|err| Error::corrupt(index_key, err.to_string())),
        }
    }

    fn write_position(&self, key: &str, pos: usize) {
        self.backend().set(&self.index_key(key), &pos.to_string());
    }

    fn remove_position(&self, key: &str) {
        self.backend().remove(&self.index_key(key));
    }

    #[inline]
    fn index_key(&self, key: &str) -> String {
        keys::child_namespace(&self.index_namespace, key)
    }

    #[inline]
    fn backend(&self) -> &B {
        self.slots.backend()
    }
}

/// Encodes `item` and checks that the slot decodes again.
fn encode_slot<D, P>(item: &Item<D, P>) -> Result<String>
where
    D: Serialize + DeserializeOwned,
    P: Serialize + DeserializeOwned,
{
    let encoded = serde_json::to_string(item)?;
    serde_json::from_str::<Item<D, P>>(&encoded)?;
    Ok(encoded)
}

fn decode_key(raw: &str) -> Result<String> {
    let slot: SlotKey = serde_json::from_str(raw)?;
    Ok(slot.key.to_string())
}

fn moved_between(from: usize, to: usize) -> Moved {
    if from == to {
        Moved::NotMoved
    } else {
        Moved::MovedTo(to)
    }
}


#[cfg(test)]
mod property_tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryBackend;

    #[derive(Debug, Clone)]
    enum Op {
        Push(u8, i32),
        Pop,
        Update(u8, i32),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..32, -50i32..50).prop_map(|(k, p)| Op::Push(k, p)),
            1 => Just(Op::Pop),
            2 => (0u8..32, -50i32..50).prop_map(|(k, p)| Op::Update(k, p)),
            2 => (0u8..32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        /// Property: heap and index invariants hold after every operation,
        /// and the heap agrees with a model map of live keys.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_hold_against_model(
            ops in prop::collection::vec(op_strategy(), 0..120)
        ) {
            let backend = MemoryBackend::new();
            let mut heap: IndexedHeap<&MemoryBackend, serde_json::Value, i32> =
                IndexedHeap::new(&backend, "prop");
            let mut model: BTreeMap<u32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Push(k, p) => {
                        let k = u32::from(k);
                        let result = heap.push(Item::new(k, json!(k), p));
                        if model.contains_key(&k) {
                            prop_assert!(matches!(result, Err(Error::DuplicateKey(_))));
                        } else {
                            prop_assert!(result.is_ok());
                            model.insert(k, p);
                        }
                    },
                    Op::Pop => {
                        if model.is_empty() {
                            prop_assert!(matches!(heap.pop(), Err(Error::EmptyContainer)));
                        } else {
                            let min = *model.values().min().unwrap();
                            let popped = heap.pop().unwrap();
                            prop_assert_eq!(popped.priority, min);
                            let ItemKey::Int(k) = popped.key else {
                                panic!("integer keys only");
                            };
                            model.remove(&(k as u32));
                        }
                    },
                    Op::Update(k, p) => {
                        let k = u32::from(k);
                        let result = heap.update_item(Item::new(k, json!(p), p));
                        if model.contains_key(&k) {
                            prop_assert!(result.is_ok());
                            model.insert(k, p);
                        } else {
                            prop_assert!(matches!(result, Err(Error::UnknownKey(_))));
                        }
                    },
                    Op::Remove(k) => {
                        let k = u32::from(k);
                        let result = heap.remove_item(k);
                        if model.remove(&k).is_some() {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert!(matches!(result, Err(Error::UnknownKey(_))));
                        }
                    },
                }

                prop_assert_eq!(heap.len().unwrap(), model.len());
                prop_assert!(heap.check_invariants().is_ok());
                for (&k, &p) in &model {
                    let stored = heap.get_item(k).unwrap().unwrap();
                    prop_assert_eq!(stored.priority, p);
                }
            }
        }

        /// Property: popping everything yields non-decreasing priorities and
        /// leaves no index entries behind.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_drain_is_sorted(
            priorities in prop::collection::vec(-1000i32..1000, 0..64)
        ) {
            let backend = MemoryBackend::new();
            let mut heap: IndexedHeap<&MemoryBackend, serde_json::Value, i32> =
                IndexedHeap::new(&backend, "drain");
            for (i, p) in priorities.iter().enumerate() {
                heap.push(Item::new(format!("k{i}"), json!(null), *p)).unwrap();
            }

            let mut drained = Vec::with_capacity(priorities.len());
            while !heap.is_empty().unwrap() {
                drained.push(heap.pop().unwrap().priority);
            }
            let mut expected = priorities.clone();
            expected.sort();
            prop_assert_eq!(drained, expected);
            prop_assert!(backend.keys_with_prefix("drain|d|").is_empty());
        }
    }
}

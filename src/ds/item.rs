//! Heap records and their keys.
//!
//! An [`Item`] is persisted as one JSON object per heap slot:
//!
//! ```text
//!   {"d":<data>,"k":<key>,"p":<priority>}
//! ```
//!
//! Keys are either integers or strings ([`ItemKey`]) and serialize untagged,
//! so `777` and `"xxx"` appear in slots exactly as given. The key index
//! addresses entries by the key's display form: `ItemKey::Int(42)` and
//! `ItemKey::Str("42")` name the same index entry.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied key of a heap item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Int(n) => write!(f, "{n}"),
            ItemKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemKey {
    fn from(n: i64) -> Self {
        ItemKey::Int(n)
    }
}

impl From<i32> for ItemKey {
    fn from(n: i32) -> Self {
        ItemKey::Int(i64::from(n))
    }
}

impl From<u32> for ItemKey {
    fn from(n: u32) -> Self {
        ItemKey::Int(i64::from(n))
    }
}

impl From<&str> for ItemKey {
    fn from(s: &str) -> Self {
        ItemKey::Str(s.to_owned())
    }
}

impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        ItemKey::Str(s)
    }
}

impl From<&ItemKey> for ItemKey {
    fn from(key: &ItemKey) -> Self {
        key.clone()
    }
}

/// One heap record: key, opaque data, and priority.
///
/// `D` is serialized without interpretation; `P` orders the heap (smaller is
/// evicted first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<D = serde_json::Value, P = f64> {
    #[serde(rename = "d")]
    pub data: D,
    #[serde(rename = "k")]
    pub key: ItemKey,
    #[serde(rename = "p")]
    pub priority: P,
}

impl<D, P> Item<D, P> {
    /// Creates an item.
    pub fn new(key: impl Into<ItemKey>, data: D, priority: P) -> Self {
        Self {
            data,
            key: key.into(),
            priority,
        }
    }
}

/// Where an entry came to rest after `update_item` / `remove_item`.
///
/// For an update the tracked entry is the updated key; for a removal it is the
/// last item, relocated into the vacated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moved {
    /// No entry changed position.
    NotMoved,
    /// The tracked entry now rests at this position.
    MovedTo(usize),
}

impl Moved {
    /// Final position, if a move happened.
    pub fn position(self) -> Option<usize> {
        match self {
            Moved::NotMoved => None,
            Moved::MovedTo(pos) => Some(pos),
        }
    }
}

// Partial views of a slot, decoded without touching `d`.

#[derive(Deserialize)]
pub(crate) struct SlotKey {
    #[serde(rename = "k")]
    pub(crate) key: ItemKey,
}

#[derive(Deserialize)]
pub(crate) struct SlotPriority<P> {
    #[serde(rename = "p")]
    pub(crate) priority: P,
}

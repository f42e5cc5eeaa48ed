//! Persistent ordered sequence over a flat key-value backend.
//!
//! A growable, 0-indexed list of strings stored under a namespace, with an
//! explicitly persisted length counter. Nothing is held in memory besides the
//! namespace and the backend handle, so a fresh instance over an existing
//! namespace sees exactly what earlier instances wrote.
//!
//! ## Layout
//!
//! ```text
//!   namespace = "tmp"
//!
//!   ┌──────────┬─────────┐
//!   │ key      │ value   │
//!   ├──────────┼─────────┤
//!   │ tmp|l    │ "3"     │  ← length counter
//!   │ tmp|0    │ "42"    │
//!   │ tmp|1    │ "test"  │
//!   │ tmp|2    │ "7"     │
//!   └──────────┴─────────┘
//!
//!   Elements occupy [0, len) with no gaps; the counter always equals the
//!   element count.
//! ```
//!
//! ## Operations
//!
//! | Operation  | Backend calls                         | Notes                    |
//! |------------|---------------------------------------|--------------------------|
//! | `push`     | 1 read, 2 writes                      | stores `value.to_string()` |
//! | `pop`      | 2 reads, 1 remove, 1 write            | `EmptyContainer` if empty |
//! | `get_at`   | 2 reads                               | bounds-checked           |
//! | `set_at`   | 1 read, 1 write                       | bounds-checked           |
//! | `len`      | 1 read                                | missing counter reads 0  |
//! | `clear`    | 1 read, `len` removes, 1 write        | counter stays, as `"0"`  |
//!
//! ## Example Usage
//!
//! ```
//! use heapcache::ds::PersistentSequence;
//! use heapcache::store::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//! let mut seq = PersistentSequence::new(&backend, "tmp");
//!
//! seq.push(42).unwrap();
//! seq.push("test").unwrap();
//! assert_eq!(seq.len().unwrap(), 2);
//!
//! // Values come back in their stored string form
//! assert_eq!(seq.pop().unwrap(), "test");
//! assert_eq!(seq.pop().unwrap(), "42");
//! assert!(seq.is_empty().unwrap());
//! ```
use std::fmt::Display;

use tracing::trace;

use crate::error::{Error, Result};
use crate::store::Backend;
use crate::store::keys;

/// Persisted, contiguous list of strings under one namespace.
#[derive(Debug, Clone)]
pub struct PersistentSequence<B> {
    backend: B,
    namespace: String,
    length_key: String,
}

impl<B: Backend> PersistentSequence<B> {
    /// Opens the sequence stored under `namespace`, trusting whatever is
    /// already persisted there.
    pub fn new(backend: B, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let length_key = keys::length_key(&namespace);
        Self {
            backend,
            namespace,
            length_key,
        }
    }

    /// Returns the namespace this sequence lives under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the backend handle.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the persisted length.
    pub fn len(&self) -> Result<usize> {
        match self.backend.get(&self.length_key) {
            None => Ok(0),
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|err| Error::corrupt(self.length_key.as_str(), err.to_string())),
        }
    }

    /// Returns `true` if the sequence holds no elements.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Appends the string form of `value`.
    pub fn push(&mut self, value: impl Display) -> Result<()> {
        let len = self.len()?;
        self.backend.set(&self.element_key(len), &value.to_string());
        self.write_len(len + 1);
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// Returns [`Error::EmptyContainer`] if the sequence is empty.
    pub fn pop(&mut self) -> Result<String> {
        let len = self.len()?;
        if len == 0 {
            return Err(Error::EmptyContainer);
        }
        let last = len - 1;
        let key = self.element_key(last);
        let value = self
            .backend
            .get(&key)
            .ok_or_else(|| Error::corrupt(key.as_str(), "element missing below length"))?;
        self.backend.remove(&key);
        self.write_len(last);
        Ok(value)
    }

    /// Drops the last element without reading it.
    pub(crate) fn truncate_last(&mut self) -> Result<()> {
        let len = self.len()?;
        if len == 0 {
            return Err(Error::EmptyContainer);
        }
        self.backend.remove(&self.element_key(len - 1));
        self.write_len(len - 1);
        Ok(())
    }

    /// Returns the element at `index`.
    pub fn get_at(&self, index: usize) -> Result<String> {
        self.check_bounds(index)?;
        let key = self.element_key(index);
        self.backend
            .get(&key)
            .ok_or_else(|| Error::corrupt(key.as_str(), "element missing below length"))
    }

    /// Overwrites the element at `index` with the string form of `value`.
    pub fn set_at(&mut self, index: usize, value: impl Display) -> Result<()> {
        self.check_bounds(index)?;
        let key = self.element_key(index);
        self.backend.set(&key, &value.to_string());
        Ok(())
    }

    /// Removes every element and resets the counter to `0`.
    ///
    /// The counter key itself stays in the backend.
    pub fn clear(&mut self) -> Result<()> {
        let len = self.len()?;
        for index in 0..len {
            self.backend.remove(&self.element_key(index));
        }
        self.write_len(0);
        trace!(namespace = %self.namespace, removed = len, "cleared sequence");
        Ok(())
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        let len = self.len()?;
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    #[inline]
    fn element_key(&self, index: usize) -> String {
        keys::element_key(&self.namespace, index)
    }

    #[inline]
    fn write_len(&self, len: usize) {
        self.backend.set(&self.length_key, &len.to_string());
    }
}

//! Storage backend contract for the persistent structures.
//!
//! A backend is a flat, synchronous, string-valued key-value store: single-key
//! `get`/`set`/`remove` plus a global `clear`. There are no transactions and
//! no multi-key atomicity; the structures built on top never query by
//! anything other than an exact key.
//!
//! Backends are shared infrastructure. Methods take `&self` so that several
//! structures (each scoped by its own namespace) can address one store; an
//! implementation provides interior mutability.

use std::rc::Rc;
use std::sync::Arc;

/// Flat string key-value store.
pub trait Backend {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Remove every entry in the store, across all namespaces.
    fn clear(&self);

    /// Check if a key exists.
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<B: Backend + ?Sized> Backend for &B {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    #[inline]
    fn clear(&self) {
        (**self).clear()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    #[inline]
    fn clear(&self) {
        (**self).clear()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }
}

impl<B: Backend + ?Sized> Backend for Rc<B> {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    #[inline]
    fn clear(&self) {
        (**self).clear()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }
}

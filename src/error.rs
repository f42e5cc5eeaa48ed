//! Error types for the heapcache library.
//!
//! ## Key Components
//!
//! - [`Error`]: Returned by the persistent structures and the cache when a
//!   caller violates a precondition (duplicate or unknown key, out-of-range
//!   position, pop on an empty container) or when persisted state cannot be
//!   decoded.
//! - [`InvariantError`]: Returned by `check_invariants` methods when the
//!   persisted heap violates the heap property or the key index disagrees
//!   with the slots.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity, empty namespace).
//!
//! ## Example Usage
//!
//! ```
//! use heapcache::error::{ConfigError, Error};
//! use heapcache::policy::priority::PriorityCache;
//! use heapcache::store::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//!
//! // Zero capacity is caught without panicking
//! let bad: Result<PriorityCache<_>, ConfigError> = PriorityCache::new(&backend, "tmp", 0);
//! assert!(bad.is_err());
//!
//! let mut cache: PriorityCache<_> = PriorityCache::new(&backend, "tmp", 4).unwrap();
//! cache.add_item(1, serde_json::json!("a"), 1.0).unwrap();
//! let dup = cache.add_item(1, serde_json::json!("b"), 2.0).unwrap_err();
//! assert!(matches!(dup, Error::DuplicateKey(_)));
//! ```

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors raised by [`PersistentSequence`](crate::ds::PersistentSequence),
/// [`IndexedHeap`](crate::ds::IndexedHeap) and
/// [`PriorityCache`](crate::policy::priority::PriorityCache).
///
/// `DuplicateKey` and `UnknownKey` are always raised before any backend
/// write, so the persisted state is unchanged when they are returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Push of a key that already has an index entry.
    #[error("attempt to push duplicate item: {0}")]
    DuplicateKey(String),

    /// Update or removal of a key that has no index entry.
    #[error("attempt to change nonexistent item: {0}")]
    UnknownKey(String),

    /// Sequence access outside `[0, len)`.
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Pop on an empty sequence or heap.
    #[error("pop from an empty container")]
    EmptyContainer,

    /// A persisted length or position could not be parsed, or a slot the
    /// length counter promises is missing.
    #[error("corrupt entry at `{key}`: {reason}")]
    Corrupt { key: String, reason: String },

    /// A heap slot could not be encoded to or decoded from JSON.
    #[error("slot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when persisted heap invariants are violated.
///
/// Produced by `check_invariants` on [`IndexedHeap`](crate::ds::IndexedHeap)
/// and [`PriorityCache`](crate::policy::priority::PriorityCache).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

impl From<Error> for InvariantError {
    fn from(err: Error) -> Self {
        Self(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`PriorityCache::new`](crate::policy::priority::PriorityCache::new)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use heapcache::builder::CacheBuilder;
/// use heapcache::store::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// let err = CacheBuilder::new(0).try_build::<_, u32>(&backend).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Error ------------------------------------------------------------

    #[test]
    fn duplicate_key_display_names_key() {
        let err = Error::DuplicateKey("777".into());
        assert_eq!(err.to_string(), "attempt to push duplicate item: 777");
    }

    #[test]
    fn unknown_key_display_names_key() {
        let err = Error::UnknownKey("xxx".into());
        assert!(err.to_string().contains("nonexistent item"));
        assert!(err.to_string().contains("xxx"));
    }

    #[test]
    fn out_of_range_display_includes_bounds() {
        let err = Error::IndexOutOfRange { index: 42, len: 2 };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn corrupt_helper_builds_variant() {
        let err = Error::corrupt("tmp|l", "not a number");
        match err {
            Error::Corrupt { key, reason } => {
                assert_eq!(key, "tmp|l");
                assert_eq!(reason, "not a number");
            },
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn serde_errors_convert() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<Error>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("heap property violated at 3");
        assert_eq!(err.to_string(), "heap property violated at 3");
        assert_eq!(err.message(), "heap property violated at 3");
    }

    #[test]
    fn invariant_from_error_keeps_description() {
        let err: InvariantError = Error::EmptyContainer.into();
        assert_eq!(err.message(), "pop from an empty container");
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}

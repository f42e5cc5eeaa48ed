//! Backend key layout.
//!
//! Every structure lives under a namespace `N`; all keys it writes are
//! `"N|..."`:
//!
//! ```text
//!   N|l          sequence length (decimal)
//!   N|<i>        sequence element i
//!   N|i|l        heap length           (sequence under child namespace "N|i")
//!   N|i|<i>      heap slot i (JSON)
//!   N|d|<k>      key index: position of key k (decimal)
//! ```

/// Separator between namespace components.
pub const SEPARATOR: char = '|';

/// Tag of the length counter inside a sequence namespace.
pub const LENGTH_TAG: &str = "l";

/// Tag of the heap's slot sequence inside a heap namespace.
pub const SLOTS_TAG: &str = "i";

/// Tag of the key index inside a heap namespace.
pub const INDEX_TAG: &str = "d";

/// Key of the length counter of the sequence under `namespace`.
#[inline]
pub fn length_key(namespace: &str) -> String {
    format!("{namespace}{SEPARATOR}{LENGTH_TAG}")
}

/// Key of element `index` of the sequence under `namespace`.
#[inline]
pub fn element_key(namespace: &str, index: usize) -> String {
    format!("{namespace}{SEPARATOR}{index}")
}

/// Namespace nested under `namespace` with the given tag.
#[inline]
pub fn child_namespace(namespace: &str, tag: &str) -> String {
    format!("{namespace}{SEPARATOR}{tag}")
}

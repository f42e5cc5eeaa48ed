//! Cache-key derivation from a URL and a parameter set.
//!
//! [`key_from_url`] turns `(url, {name: value, ...})` into a stable string
//! that does not depend on parameter order:
//!
//! ```text
//!   url = "http://www.example.com/sample"
//!   params = { b: "zzz", a: 1 }
//!
//!   1. sort names           a=1, b=zzz
//!   2. length-prefix each   [29]http://...  [1]a [1]1  [1]b [3]zzz
//!   3. SHA-256, hex         "3f1c…"
//! ```
//!
//! Length prefixes make the encoding injective: no choice of names or values
//! can shift bytes between fields, so distinct inputs only collide if SHA-256
//! does. Values are compared by their `Display` form: the integer `1` and
//! the `&str` `"1"` name the same value, while a `serde_json::Value` string
//! keeps its JSON quotes (`json!("1")` displays as `"1"` with the quotes) and
//! so differs from both. Pick one value type per call site.

use std::collections::BTreeMap;
use std::fmt::Display;

use sha2::{Digest, Sha256};

/// Derives an order-independent fingerprint of `url` and `params`.
///
/// If a name appears more than once, its last value wins.
///
/// # Example
///
/// ```
/// use heapcache::fingerprint::key_from_url;
///
/// let url = "http://www.example.com/sample";
/// let k1 = key_from_url(url, [("a", "1"), ("b", "zzz"), ("c", "aaa")]);
/// let k2 = key_from_url(url, [("b", "zzz"), ("a", "1"), ("c", "aaa")]);
/// let k3 = key_from_url(url, [("b", "xxx"), ("a", "1"), ("c", "aaa")]);
///
/// assert_eq!(k1, k2);
/// assert_ne!(k1, k3);
/// assert_eq!(k1.len(), 64);
/// ```
pub fn key_from_url<I, K, V>(url: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(name, value)| (name.as_ref().to_owned(), value.to_string()))
        .collect();

    let mut hasher = Sha256::new();
    update_field(&mut hasher, url);
    hasher.update((sorted.len() as u64).to_le_bytes());
    for (name, value) in &sorted {
        update_field(&mut hasher, name);
        update_field(&mut hasher, value);
    }
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    const SAMPLE: &str = "http://www.example.com/sample";

    #[test]
    fn permutations_share_a_key() {
        let a = ("a", json!(1));
        let b = ("b", json!("zzz"));
        let c = ("c", json!("aaa"));
        let k1 = key_from_url(SAMPLE, [a.clone(), b.clone(), c.clone()]);
        let k2 = key_from_url(SAMPLE, [b.clone(), a.clone(), c.clone()]);
        let k3 = key_from_url(SAMPLE, [c, b, a]);
        assert_eq!(k1, k2);
        assert_eq!(k1, k3);
    }

    #[test]
    fn json_strings_keep_their_quotes() {
        // Display of a JSON string includes the quotes
        let plain = key_from_url(SAMPLE, [("b", "zzz")]);
        let json_str = key_from_url(SAMPLE, [("b", json!("zzz"))]);
        let quoted = key_from_url(SAMPLE, [("b", "\"zzz\"")]);
        assert_ne!(plain, json_str);
        assert_eq!(json_str, quoted);
        // JSON numbers display bare
        assert_eq!(key_from_url(SAMPLE, [("a", json!(1))]), key_from_url(SAMPLE, [("a", 1)]));
    }

    #[test]
    fn changed_value_changes_key() {
        let k1 = key_from_url(SAMPLE, [("a", "1"), ("b", "zzz"), ("c", "aaa")]);
        let k3 = key_from_url(SAMPLE, [("b", "xxx"), ("a", "1"), ("c", "aaa")]);
        assert_ne!(k1, k3);
    }

    #[test]
    fn changed_url_changes_key() {
        let k1 = key_from_url(SAMPLE, [("a", "1"), ("b", "zzz")]);
        let k4 = key_from_url("http://www.example.com/simple", [("b", "zzz"), ("a", "1")]);
        assert_ne!(k1, k4);
    }

    #[test]
    fn added_or_removed_parameter_changes_key() {
        let base = key_from_url(SAMPLE, [("a", "1")]);
        let added = key_from_url(SAMPLE, [("a", "1"), ("b", "")]);
        let none = key_from_url(SAMPLE, Vec::<(&str, &str)>::new());
        assert_ne!(base, added);
        assert_ne!(base, none);
        assert_ne!(added, none);
    }

    #[test]
    fn separators_cannot_be_forged() {
        // Same concatenated text, different field boundaries
        let a = key_from_url(SAMPLE, [("a", "1&b=2")]);
        let b = key_from_url(SAMPLE, [("a", "1"), ("b", "2")]);
        assert_ne!(a, b);

        let c = key_from_url("http://x/?a=1", Vec::<(&str, &str)>::new());
        let d = key_from_url("http://x/", [("a", "1")]);
        assert_ne!(c, d);

        let e = key_from_url(SAMPLE, [("ab", "c")]);
        let f = key_from_url(SAMPLE, [("a", "bc")]);
        assert_ne!(e, f);
    }

    #[test]
    fn accepts_maps_and_numbers() {
        let mut params = HashMap::new();
        params.insert("page", 2);
        params.insert("limit", 50);
        let from_map = key_from_url(SAMPLE, &params);
        let from_pairs = key_from_url(SAMPLE, [("limit", 50), ("page", 2)]);
        assert_eq!(from_map, from_pairs);
        // Display form: 1 and "1" are the same value
        assert_eq!(key_from_url(SAMPLE, [("a", 1)]), key_from_url(SAMPLE, [("a", "1")]));
    }

    #[test]
    fn key_is_lowercase_hex() {
        let key = key_from_url(SAMPLE, [("a", "1")]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key, key_from_url(SAMPLE, [("a", "1")]));
    }
}

//! Fast hash map and hash set type aliases.
//!
//! Mapping payloads and gate metadata are small string-keyed maps that never
//! see untrusted keys at a volume where `DoS` resistance matters, so the
//! workspace uses the Fx hasher from `rustc-hash` everywhere.
//!
//! # Examples
//!
//! ```
//! use mg_core::{FxHashMap, fx_hash_map};
//!
//! let mut fields: FxHashMap<String, i64> = fx_hash_map();
//! fields.insert("id".to_owned(), 42);
//! assert_eq!(fields.get("id"), Some(&42));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_deduplicates() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        assert!(set.insert("Security"));
        assert!(!set.insert("Security"));
        assert_eq!(set.len(), 1);
    }
}

//! This module provides a deterministic string hash and `HashMap` and `HashSet` variants that use
//! a deterministic hasher. The hashing data structures in the standard library are not
//! deterministic:
//!
//! > By default, HashMap uses a hashing algorithm selected to provide
//! > resistance against HashDoS attacks. The algorithm is randomly seeded, and a
//! > reasonable best-effort is made to generate this seed from a high quality,
//! > secure source of randomness provided by the host without blocking the program.
//!
//! Use `HashMap::default()` instead of `HashMap::new()` to create a new map with the
//! deterministic hasher.
//!
//! The `hash_str` free function turns a run's seed string into the `u64` used to seed
//! [`crate::random::SimRng`]. It must give the same answer on every platform.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_string_has_a_hash() {
        // xxh3 of the empty input is a published constant.
        assert_eq!(hash_str(""), 0x2D06_8005_38D3_94C2);
    }
}

//! Collection types used across Stipple.
//!
//! Scene maps and selection lookups are keyed by small integers and short
//! strings, where AHash is noticeably faster than SipHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert(("x", "y"), 3usize);
        assert_eq!(map.get(&("x", "y")), Some(&3));
    }

    #[test]
    fn test_hashset_ahash() {
        let set: HashSet<usize> = [1, 4, 9].into_iter().collect();
        assert!(set.contains(&4));
        assert!(!set.contains(&5));
    }
}

//! LRU Tracker Module
//!
//! Keeps memo keys ordered by recency so the cache knows what to evict.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks key recency for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Whether "used" means accessed or merely inserted is decided by the caller:
/// the memo cache only promotes on hits when refresh-on-access is enabled.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Promote ==
    /// Moves `key` to the most-recently-used position, inserting it if unknown.
    pub fn promote(&mut self, key: &str) {
        if self.order.front().is_some_and(|k| k == key) {
            return;
        }
        self.forget(key);
        self.order.push_front(key.to_string());
    }

    // == Forget ==
    /// Drops a key from the ordering. Unknown keys are ignored.
    pub fn forget(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Least Recent ==
    /// Iterates keys from least to most recently used.
    pub fn least_recent(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().rev().map(String::as_str)
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_new() {
        let lru = LruTracker::new();
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.least_recent().next(), None);
    }

    #[test]
    fn test_promote_orders_by_insertion() {
        let mut lru = LruTracker::new();

        lru.promote("[1]");
        lru.promote("[2]");
        lru.promote("[3]");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.least_recent().next(), Some("[1]"));
    }

    #[test]
    fn test_promote_existing_key_moves_it_to_front() {
        let mut lru = LruTracker::new();

        lru.promote("a");
        lru.promote("b");
        lru.promote("c");
        lru.promote("a");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.least_recent().collect::<Vec<_>>(), ["b", "c", "a"]);
    }

    #[test]
    fn test_promote_front_key_is_noop() {
        let mut lru = LruTracker::new();

        lru.promote("a");
        lru.promote("a");
        lru.promote("a");

        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_forget() {
        let mut lru = LruTracker::new();

        lru.promote("a");
        lru.promote("b");
        lru.promote("c");
        lru.forget("b");
        lru.forget("missing");

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains("b"));
        assert!(lru.contains("a"));
        assert!(lru.contains("c"));
    }

    #[test]
    fn test_clear() {
        let mut lru = LruTracker::new();
        lru.promote("a");
        lru.promote("b");

        lru.clear();

        assert_eq!(lru.len(), 0);
        assert_eq!(lru.least_recent().next(), None);
    }
}

//! Cache Statistics Module
//!
//! Tracks memo cache counters: hits, joins, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Memo cache performance counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Calls answered from a settled entry
    pub hits: u64,
    /// Calls that joined an in-flight call instead of starting a new one
    pub joins: u64,
    /// Calls that had to invoke the wrapped function
    pub misses: u64,
    /// Entries evicted to respect the entry limit
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of calls served without invoking the wrapped function.
    ///
    /// Returns (hits + joins) / (hits + joins + misses), or 0.0 if no calls
    /// have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.joins;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_join(&mut self) {
        self.joins += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

//! Cache Module
//!
//! Function memoization with LRU eviction, TTL expiration and single-flight
//! de-duplication of in-flight async calls.

mod entry;
mod key;
mod lru;
mod memo;
mod stats;


// Re-export public types
pub use entry::{CacheEntry, EntryState, InFlight};
pub use key::{key_fn, CanonicalJson, KeyFn, KeyStrategy, FALLBACK_KEY_PREFIX};
pub use lru::LruTracker;
pub use memo::{AsyncMemoized, MemoCache, MemoFuture, MemoOptions, Memoized};
pub use stats::CacheStats;

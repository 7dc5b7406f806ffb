//! Storage Module
//!
//! Persistent, namespaced key/value storage with lazily checked expiry.

mod medium;
mod record;
mod store;


pub use medium::{FileMedium, MemoryMedium, StorageMedium};
pub use record::{current_timestamp_ms, StoredRecord};
pub use store::PersistentStore;

/// Namespace prepended to every key the application persists.
pub const DEFAULT_PREFIX: &str = "pokeview@";

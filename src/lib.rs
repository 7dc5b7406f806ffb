//! PokéView Cache - memoization and persistent storage for a catalog service
//!
//! Provides an LRU/TTL memo cache with async single-flight, a namespaced
//! persistent store with lazy expiry, and a Pokémon catalog served over HTTP.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use api::AppState;
pub use catalog::Catalog;
pub use config::Config;

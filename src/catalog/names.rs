//! Name Database
//!
//! The full list of entity names, persisted between runs and filtered by
//! search queries.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::catalog::{sanitize_name, CatalogSource};
use crate::storage::PersistentStore;

/// Storage key of the persisted name list.
pub const NAMES_KEY: &str = "pokemons";

// == Name Database ==
/// Immutable, lowercase list of every known entity name.
///
/// `version` identifies the list contents so query results computed against
/// one list are never served for another.
#[derive(Debug, Clone)]
pub struct NameDatabase {
    names: Arc<Vec<String>>,
    version: u64,
}

impl NameDatabase {
    pub fn new(names: Vec<String>) -> Self {
        let names: Vec<String> = names.into_iter().map(|n| n.to_lowercase()).collect();

        let mut hasher = DefaultHasher::new();
        names.hash(&mut hasher);

        Self {
            version: hasher.finish(),
            names: Arc::new(names),
        }
    }

    /// Loads the name list from storage, or fetches and persists it.
    ///
    /// Never fails: an unreachable source yields an empty database and a
    /// storage failure only costs persistence.
    ///
    /// # Arguments
    /// * `store` - Store holding the list under [`NAMES_KEY`]
    /// * `source` - Upstream consulted when nothing valid is stored
    /// * `ttl_hours` - Lifetime of the persisted list
    pub async fn init(store: &PersistentStore, source: &dyn CatalogSource, ttl_hours: f64) -> Self {
        match store.get::<Vec<String>>(NAMES_KEY) {
            Ok(Some(names)) => {
                info!("Loaded {} names from storage", names.len());
                return Self::new(names);
            }
            Ok(None) => {}
            Err(err) => warn!("Failed to read stored names: {}", err),
        }

        let db = match source.fetch_names().await {
            Ok(names) => Self::new(names),
            Err(err) => {
                error!("Failed to fetch name list: {}", err);
                return Self::new(Vec::new());
            }
        };

        if db.is_empty() {
            warn!("Upstream returned an empty name list");
        } else if let Err(err) = store.set(NAMES_KEY, db.names(), Some(ttl_hours)) {
            warn!("Failed to persist name list: {}", err);
        }

        info!("Fetched {} names", db.len());
        db
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether `slug` (already lowercase) is a known name.
    pub fn contains(&self, slug: &str) -> bool {
        self.names.iter().any(|n| n == slug)
    }

    /// Names containing the sanitized, lowercased `query`. An empty query
    /// matches everything.
    pub fn query(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.names.to_vec();
        }

        let needle = sanitize_name(query).to_lowercase();
        self.names
            .iter()
            .filter(|name| name.contains(&needle))
            .cloned()
            .collect()
    }
}

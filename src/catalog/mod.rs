//! Catalog Module
//!
//! Application layer over the cache and storage: name search, memoized
//! entity lookups and favorites.

mod entity;
mod favorites;
mod names;
mod sanitize;
mod source;

pub use entity::{Card, Pokemon};
pub use favorites::{Favorites, FAVORITES_KEY};
pub use names::{NameDatabase, NAMES_KEY};
pub use sanitize::sanitize_name;
pub use source::{CatalogSource, PokeApiSource};

#[cfg(test)]
pub(crate) use source::fake::StaticSource;

use std::convert::Infallible;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    AsyncMemoized, CacheStats, CanonicalJson, KeyFn, KeyStrategy, MemoCache, Memoized,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::storage::PersistentStore;

type SearchFn = Box<dyn Fn(String) -> Vec<String> + Send + Sync>;
type SearchKey = KeyFn<Box<dyn Fn(&String) -> String + Send + Sync>>;
type FetchFn = Box<dyn Fn(String) -> BoxFuture<'static, Result<Pokemon>> + Send + Sync>;

/// Hit and miss counters of both catalog caches.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub names: usize,
    pub queries: CacheStats,
    pub entities: CacheStats,
}

// == Catalog ==
/// Search, lookup and favorites over one name database.
pub struct Catalog {
    names: NameDatabase,
    search: Memoized<String, Vec<String>, Infallible, SearchFn, SearchKey>,
    fetch: AsyncMemoized<String, Pokemon, CacheError, FetchFn>,
    favorites: Favorites,
}

impl Catalog {
    /// Builds a catalog over an already loaded name database.
    ///
    /// # Errors
    /// `InvalidArgument` when a configured cache limit is zero.
    pub fn new(
        config: &Config,
        store: PersistentStore,
        source: Arc<dyn CatalogSource>,
        names: NameDatabase,
    ) -> Result<Self> {
        let query_cache = MemoCache::new(config.query_cache_options())?;
        let entity_cache = MemoCache::new(config.entity_cache_options())?;

        // Results are only valid for the list they were computed from
        let version = names.version();
        let search_key: Box<dyn Fn(&String) -> String + Send + Sync> =
            Box::new(move |query: &String| {
                format!("{}:{}", version, CanonicalJson.derive(query))
            });
        let db = names.clone();
        let search: SearchFn = Box::new(move |query: String| db.query(&query));

        let fetch: FetchFn = Box::new(move |name: String| {
            let source = Arc::clone(&source);
            async move {
                debug!("Fetching {} from upstream", name);
                let result = source.fetch_entity(&name).await;
                if let Err(err) = &result {
                    warn!("Failed to fetch {}: {}", name, err);
                }
                result
            }
            .boxed()
        });

        Ok(Self {
            names,
            search: query_cache.wrap_with_key(search, KeyFn(search_key), None),
            fetch: entity_cache.wrap_async(fetch, None),
            favorites: Favorites::new(store),
        })
    }

    /// Loads the name database (see [`NameDatabase::init`]) and builds the
    /// catalog over it.
    pub async fn init(
        config: &Config,
        store: PersistentStore,
        source: Arc<dyn CatalogSource>,
    ) -> Result<Self> {
        let names = NameDatabase::init(&store, source.as_ref(), config.names_ttl_hours).await;
        Self::new(config, store, source, names)
    }

    pub fn names(&self) -> &NameDatabase {
        &self.names
    }

    // == Search ==
    /// Names matching `query`, memoized per query.
    pub fn search(&self, query: &str) -> Vec<String> {
        self.search.call(query.to_string())
    }

    // == Lookup ==
    /// Fetches the record for `name`, sharing concurrent and repeated
    /// lookups of the same name.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank name
    /// - `NotFound` when the name is not in the database
    /// - `Upstream` when the fetch fails; the failure is not cached
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon> {
        let slug = self.resolve(name)?;
        self.fetch.call(slug).await
    }

    /// The record for `name` together with its favorite marking.
    pub async fn card(&self, name: &str) -> Result<Card> {
        let pokemon = self.pokemon(name).await?;
        let favorite = self.favorites.contains(&pokemon.name)?;
        Ok(Card { pokemon, favorite })
    }

    // == Favorites ==
    pub fn favorites(&self) -> Result<Vec<String>> {
        self.favorites.list()
    }

    pub fn is_favorite(&self, name: &str) -> Result<bool> {
        let slug = self.resolve(name)?;
        self.favorites.contains(&slug)
    }

    /// Marks or unmarks `name` as a favorite.
    pub fn set_favorite(&self, name: &str, favorite: bool) -> Result<()> {
        let slug = self.resolve(name)?;
        self.favorites.set(&slug, favorite)
    }

    /// Flips the favorite marking of `name`; returns the new marking.
    pub fn toggle_favorite(&self, name: &str) -> Result<bool> {
        let slug = self.resolve(name)?;
        self.favorites.toggle(&slug)
    }

    // == Maintenance ==
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            names: self.names.len(),
            queries: self.search.cache().stats(),
            entities: self.fetch.cache().stats(),
        }
    }

    /// Drops every memoized search and lookup.
    pub fn clear_caches(&self) {
        self.search.cache().clear();
        self.fetch.cache().clear();
    }

    fn resolve(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(CacheError::InvalidArgument("Name cannot be empty".to_string()));
        }

        let slug = sanitize_name(name).to_lowercase();
        if !self.names.contains(&slug) {
            return Err(CacheError::NotFound(format!("Unknown Pokémon '{name}'")));
        }
        Ok(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::source::fake::StaticSource;
    use super::*;
    use crate::storage::MemoryMedium;
    use std::sync::atomic::Ordering;

    fn catalog_with(source: Arc<StaticSource>) -> Catalog {
        let names = ["Pikachu", "Raichu", "Mr-Mime", "Mew"];
        let db = NameDatabase::new(names.iter().map(|n| n.to_string()).collect());
        let store = PersistentStore::new(Arc::new(MemoryMedium::new()));
        Catalog::new(&Config::default(), store, source, db).unwrap()
    }

    fn source() -> Arc<StaticSource> {
        Arc::new(StaticSource::with_names(&["pikachu", "raichu", "mr-mime", "mew"]))
    }

    #[test]
    fn test_search_is_memoized() {
        let catalog = catalog_with(source());

        assert_eq!(catalog.search("chu"), ["pikachu", "raichu"]);
        assert_eq!(catalog.search("chu"), ["pikachu", "raichu"]);
        assert_eq!(catalog.search(""), catalog.names().names());

        let stats = catalog.stats().queries;
        assert_eq!((stats.hits, stats.misses), (1, 2));
    }

    #[tokio::test]
    async fn test_lookup_sanitizes_name() {
        let catalog = catalog_with(source());

        let pokemon = catalog.pokemon("Mr. Mime").await.unwrap();
        assert_eq!(pokemon.name, "mr-mime");
    }

    #[tokio::test]
    async fn test_lookup_rejects_blank_and_unknown() {
        let source = source();
        let catalog = catalog_with(source.clone());

        assert!(matches!(catalog.pokemon("  ").await, Err(CacheError::InvalidArgument(_))));
        assert!(matches!(catalog.pokemon("agumon").await, Err(CacheError::NotFound(_))));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_cache() {
        let source = source();
        let catalog = catalog_with(source.clone());

        catalog.pokemon("pikachu").await.unwrap();
        catalog.pokemon("PIKACHU").await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(catalog.stats().entities.hits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_fetch() {
        let source = source();
        let catalog = catalog_with(source.clone());

        let (a, b, c) = tokio::join!(
            catalog.pokemon("mew"),
            catalog.pokemon("Mew"),
            catalog.pokemon("mew"),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert_eq!(source.calls(), 1);
        assert_eq!(catalog.stats().entities.joins, 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let source = source();
        let catalog = catalog_with(source.clone());

        source.failing.store(true, Ordering::SeqCst);
        assert!(matches!(catalog.pokemon("raichu").await, Err(CacheError::Upstream(_))));

        source.failing.store(false, Ordering::SeqCst);
        assert_eq!(catalog.pokemon("raichu").await.unwrap().name, "raichu");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_card_reflects_favorites() {
        let catalog = catalog_with(source());

        assert!(!catalog.card("pikachu").await.unwrap().favorite);
        assert!(catalog.toggle_favorite("Pikachu").unwrap());
        assert!(catalog.card("pikachu").await.unwrap().favorite);
        assert!(catalog.is_favorite("pikachu").unwrap());
        assert_eq!(catalog.favorites().unwrap(), ["pikachu"]);

        assert!(!catalog.toggle_favorite("pikachu").unwrap());
        assert!(catalog.favorites().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_unknown_favorite_is_not_found() {
        let catalog = catalog_with(source());
        assert!(matches!(catalog.toggle_favorite("agumon"), Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_caches_forces_refetch() {
        let source = source();
        let catalog = catalog_with(source.clone());

        catalog.pokemon("mew").await.unwrap();
        catalog.clear_caches();
        catalog.pokemon("mew").await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_init_loads_names_from_source() {
        let store = PersistentStore::new(Arc::new(MemoryMedium::new()));
        let catalog = Catalog::init(&Config::default(), store, source()).await.unwrap();

        assert_eq!(catalog.names().len(), 4);
        assert_eq!(catalog.search("mime"), ["mr-mime"]);
    }
}

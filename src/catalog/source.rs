//! Upstream Catalog Source
//!
//! The remote, read-only data the catalog caches: the full name list and
//! per-name records.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::catalog::entity::{ApiPokemon, NamedResourceList};
use crate::catalog::Pokemon;
use crate::error::{CacheError, Result};

// == Catalog Source ==
/// Async source of catalog data. Failures are reported as `Upstream`.
pub trait CatalogSource: Send + Sync {
    /// Fetches every entity name.
    fn fetch_names(&self) -> BoxFuture<'_, Result<Vec<String>>>;

    /// Fetches the record of one entity by its lowercase slug.
    fn fetch_entity<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Pokemon>>;
}

// == PokeAPI Source ==
/// [`CatalogSource`] backed by the public PokeAPI over HTTP.
#[derive(Debug, Clone)]
pub struct PokeApiSource {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiSource {
    /// Creates a source rooted at `base_url` (e.g. `https://pokeapi.co/api/v2/`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CacheError::Internal(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        self.client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| CacheError::Upstream(format!("GET {url}: {err}")))?
            .json::<T>()
            .await
            .map_err(|err| CacheError::Upstream(format!("Invalid response from {url}: {err}")))
    }
}

impl CatalogSource for PokeApiSource {
    fn fetch_names(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        async move {
            let list: NamedResourceList = self.get_json("pokemon?limit=100000&offset=0").await?;
            Ok(list.results.into_iter().map(|r| r.name).collect())
        }
        .boxed()
    }

    fn fetch_entity<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Pokemon>> {
        async move {
            let record: ApiPokemon = self.get_json(&format!("pokemon/{name}")).await?;
            Ok(record.into())
        }
        .boxed()
    }
}

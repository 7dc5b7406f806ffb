//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::catalog::CatalogStats;

/// Response body for GET /search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// The query as received
    pub query: String,
    /// Number of matching names
    pub count: usize,
    /// Matching names in database order
    pub names: Vec<String>,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            query: query.into(),
            count: names.len(),
            names,
        }
    }
}

/// Response body for GET /favorites
#[derive(Debug, Clone, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

/// Response body for PUT, DELETE and POST .../toggle on /favorites/:name
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteResponse {
    /// Normalized name
    pub name: String,
    /// Marking after the request
    pub favorite: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Size of the name database
    pub names: usize,
    /// Search result cache
    pub queries: CacheStatsView,
    /// Fetched record cache
    pub entities: CacheStatsView,
}

/// One cache's counters plus its derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsView {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsView {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

impl From<CatalogStats> for StatsResponse {
    fn from(stats: CatalogStats) -> Self {
        Self {
            names: stats.names,
            queries: stats.queries.into(),
            entities: stats.entities.into(),
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Caches cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

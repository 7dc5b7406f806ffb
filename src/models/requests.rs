//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string of the search endpoint (GET /search?q=...)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Search text; missing means match everything
    #[serde(default)]
    pub q: String,
}

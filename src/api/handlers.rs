//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::catalog::{sanitize_name, Card, Catalog};
use crate::error::Result;
use crate::models::{
    ClearResponse, FavoriteResponse, FavoritesResponse, HealthResponse, SearchParams,
    SearchResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The catalog synchronizes internally, so handlers share it without an
/// outer lock.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Handler for GET /search?q=...
///
/// Returns every name containing the query; an empty query lists all names.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let names = state.catalog.search(&params.q);
    Json(SearchResponse::new(params.q, names))
}

/// Handler for GET /pokemon/:name
///
/// Returns the record card, fetching it upstream on a cache miss.
pub async fn pokemon_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Card>> {
    let card = state.catalog.card(&name).await?;
    Ok(Json(card))
}

/// Handler for GET /favorites
pub async fn favorites_handler(State(state): State<AppState>) -> Result<Json<FavoritesResponse>> {
    let favorites = state.catalog.favorites()?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// Handler for PUT /favorites/:name
///
/// Marks a known name as favorite. Repeating the request changes nothing.
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    state.catalog.set_favorite(&name, true)?;
    Ok(Json(favorite_response(&name, true)))
}

/// Handler for DELETE /favorites/:name
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    state.catalog.set_favorite(&name, false)?;
    Ok(Json(favorite_response(&name, false)))
}

/// Handler for POST /favorites/:name/toggle
///
/// Flips the favorite marking of a known name.
pub async fn toggle_favorite_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    let favorite = state.catalog.toggle_favorite(&name)?;
    Ok(Json(favorite_response(&name, favorite)))
}

fn favorite_response(name: &str, favorite: bool) -> FavoriteResponse {
    FavoriteResponse {
        name: sanitize_name(name).to_lowercase(),
        favorite,
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.catalog.stats().into())
}

/// Handler for DELETE /cache
///
/// Drops memoized searches and records. Persisted data is kept.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.catalog.clear_caches();
    Json(ClearResponse::cleared())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_favorite_handler, clear_handler, favorites_handler, health_handler, pokemon_handler,
    remove_favorite_handler, search_handler, stats_handler, toggle_favorite_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(search_handler))
        .route("/pokemon/:name", get(pokemon_handler))
        .route("/favorites", get(favorites_handler))
        .route(
            "/favorites/:name",
            put(add_favorite_handler).delete(remove_favorite_handler),
        )
        .route("/favorites/:name/toggle", post(toggle_favorite_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

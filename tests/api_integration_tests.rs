//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint against an
//! in-memory upstream and storage medium.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::future::{BoxFuture, FutureExt};
use pokeview_cache::{
    api::create_router,
    catalog::{Catalog, CatalogSource, Pokemon, NAMES_KEY},
    error::{CacheError, Result},
    storage::{MemoryMedium, PersistentStore, StorageMedium, DEFAULT_PREFIX},
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt;

// == Fake Upstream ==

#[derive(Default)]
struct FakeUpstream {
    entity_calls: AtomicUsize,
    down: AtomicBool,
}

impl CatalogSource for FakeUpstream {
    fn fetch_names(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        let names = ["Bulbasaur", "Pikachu", "Raichu", "Mr-Mime", "Nidoran-f"];
        futures::future::ready(Ok(names.iter().map(|n| n.to_string()).collect())).boxed()
    }

    fn fetch_entity<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Pokemon>> {
        async move {
            self.entity_calls.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(CacheError::Upstream("service unavailable".to_string()));
            }
            Ok(Pokemon {
                id: name.len() as u32,
                name: name.to_string(),
                types: vec!["electric".to_string()],
                artwork: Some(format!("https://img.example/{name}.png")),
                height: 4,
                weight: 60,
            })
        }
        .boxed()
    }
}

// == Helper Functions ==

struct TestApp {
    router: Router,
    upstream: Arc<FakeUpstream>,
    medium: Arc<MemoryMedium>,
}

async fn create_test_app() -> TestApp {
    let upstream = Arc::new(FakeUpstream::default());
    let medium = Arc::new(MemoryMedium::new());
    let store = PersistentStore::new(medium.clone());

    let catalog = Catalog::init(&Config::default(), store, upstream.clone())
        .await
        .unwrap();

    TestApp {
        router: create_router(AppState::new(catalog)),
        upstream,
        medium,
    }
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Startup ==

#[tokio::test]
async fn test_name_list_is_persisted_on_startup() {
    let app = create_test_app().await;

    let store = PersistentStore::new(app.medium.clone());
    let names: Vec<String> = store.get(NAMES_KEY).unwrap().unwrap();
    assert_eq!(names.len(), 5);
    assert!(names.iter().all(|n| n == &n.to_lowercase()));

    assert!(app
        .medium
        .keys()
        .unwrap()
        .iter()
        .all(|k| k.starts_with(DEFAULT_PREFIX)));
}

// == Search Endpoint Tests ==

#[tokio::test]
async fn test_search_endpoint() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/search?q=chu").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "chu");
    assert_eq!(json["count"], 2);
    assert_eq!(json["names"], serde_json::json!(["pikachu", "raichu"]));
}

#[tokio::test]
async fn test_search_without_query_lists_everything() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/search").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 5);
}

#[tokio::test]
async fn test_search_normalizes_query() {
    let app = create_test_app().await;

    let (_, json) = send(&app.router, "GET", "/search?q=Mr.%20M").await;

    assert_eq!(json["names"], serde_json::json!(["mr-mime"]));
}

// == Pokemon Endpoint Tests ==

#[tokio::test]
async fn test_pokemon_endpoint_success() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/pokemon/Pikachu").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "pikachu");
    assert_eq!(json["types"], serde_json::json!(["electric"]));
    assert_eq!(json["favorite"], false);
}

#[tokio::test]
async fn test_pokemon_endpoint_is_cached() {
    let app = create_test_app().await;

    send(&app.router, "GET", "/pokemon/raichu").await;
    send(&app.router, "GET", "/pokemon/RAICHU").await;

    assert_eq!(app.upstream.entity_calls.load(Ordering::SeqCst), 1);

    let (_, stats) = send(&app.router, "GET", "/stats").await;
    assert_eq!(stats["entities"]["hits"], 1);
    assert_eq!(stats["entities"]["misses"], 1);
}

#[tokio::test]
async fn test_pokemon_endpoint_unknown_name() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/pokemon/agumon").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("agumon"));
    assert_eq!(app.upstream.entity_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pokemon_endpoint_blank_name() {
    let app = create_test_app().await;

    let (status, _) = send(&app.router, "GET", "/pokemon/%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_retried() {
    let app = create_test_app().await;

    app.upstream.down.store(true, Ordering::SeqCst);
    let (status, json) = send(&app.router, "GET", "/pokemon/bulbasaur").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json.get("error").is_some());

    app.upstream.down.store(false, Ordering::SeqCst);
    let (status, _) = send(&app.router, "GET", "/pokemon/bulbasaur").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.upstream.entity_calls.load(Ordering::SeqCst), 2);
}

// == Favorites Endpoint Tests ==

#[tokio::test]
async fn test_mark_and_unmark_favorite() {
    let app = create_test_app().await;

    for _ in 0..2 {
        let (status, json) = send(&app.router, "PUT", "/favorites/Nidoran%20%E2%99%80").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "nidoran-f");
        assert_eq!(json["favorite"], true);
    }

    let (_, card) = send(&app.router, "GET", "/pokemon/nidoran-f").await;
    assert_eq!(card["favorite"], true);

    let (_, list) = send(&app.router, "GET", "/favorites").await;
    assert_eq!(list["favorites"], serde_json::json!(["nidoran-f"]));

    for _ in 0..2 {
        let (status, json) = send(&app.router, "DELETE", "/favorites/nidoran-f").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["favorite"], false);
    }

    let (_, list) = send(&app.router, "GET", "/favorites").await;
    assert_eq!(list["favorites"], serde_json::json!([]));
}

#[tokio::test]
async fn test_toggle_favorite_flips_marking() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "POST", "/favorites/pikachu/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["favorite"], true);

    let (_, json) = send(&app.router, "POST", "/favorites/pikachu/toggle").await;
    assert_eq!(json["favorite"], false);

    let (_, list) = send(&app.router, "GET", "/favorites").await;
    assert_eq!(list["favorites"], serde_json::json!([]));
}

#[tokio::test]
async fn test_unknown_favorite_is_not_found() {
    let app = create_test_app().await;

    let (status, _) = send(&app.router, "PUT", "/favorites/agumon").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, "POST", "/favorites/agumon/toggle").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Maintenance Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["names"], 5);
    assert!(json["queries"].get("hit_rate").is_some());
    assert!(json["entities"].get("evictions").is_some());
}

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let app = create_test_app().await;

    send(&app.router, "GET", "/pokemon/pikachu").await;
    let (status, _) = send(&app.router, "DELETE", "/cache").await;
    assert_eq!(status, StatusCode::OK);

    send(&app.router, "GET", "/pokemon/pikachu").await;
    assert_eq!(app.upstream.entity_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let (status, json) = send(&app.router, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

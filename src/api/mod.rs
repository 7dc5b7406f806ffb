//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /search?q=` - Names matching a query
//! - `GET /pokemon/:name` - Record card for one name
//! - `GET /favorites` - Favorite names
//! - `PUT /favorites/:name` - Mark a favorite
//! - `DELETE /favorites/:name` - Unmark a favorite
//! - `POST /favorites/:name/toggle` - Flip a favorite
//! - `GET /stats` - Cache statistics
//! - `DELETE /cache` - Drop memoized results
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! Error types for the cache layer and catalog service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for caching, storage and catalog operations.
///
/// `Clone` so a single upstream failure can be handed to every caller that
/// joined the same in-flight call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A precondition on the call was violated (empty key, null value, zero limit)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested name is not part of the catalog
    #[error("Not found: {0}")]
    NotFound(String),

    /// The wrapped or upstream call failed
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// A stored record could not be decoded
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// The storage medium refused a write because its quota is exhausted
    #[error("Storage exhausted: {0}")]
    StorageExhausted(String),

    /// The storage medium failed to read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::StorageExhausted(_) => StatusCode::INSUFFICIENT_STORAGE,
            CacheError::CorruptRecord(_) | CacheError::Storage(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::InvalidArgument("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("pikachu".into()), StatusCode::NOT_FOUND),
            (CacheError::Upstream("timeout".into()), StatusCode::BAD_GATEWAY),
            (
                CacheError::StorageExhausted("quota".into()),
                StatusCode::INSUFFICIENT_STORAGE,
            ),
            (
                CacheError::Storage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = CacheError::Upstream("connection reset".to_string());
        assert_eq!(err.to_string(), "Upstream failure: connection reset");
    }
}

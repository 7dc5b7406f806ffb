//! Persistent Store Module
//!
//! Namespaced, TTL-aware key/value store over a `StorageMedium`. Expiry is
//! checked lazily: a record is only found stale (and deleted) when it is read.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::storage::{current_timestamp_ms, StorageMedium, StoredRecord, DEFAULT_PREFIX};

// == Persistent Store ==
/// Key/value store that owns every medium key starting with its prefix.
///
/// Cloning yields another handle to the same medium.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    medium: Arc<dyn StorageMedium>,
    prefix: String,
}

impl PersistentStore {
    // == Constructors ==
    /// Creates a store under the default `pokeview@` namespace.
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        Self::with_prefix(medium, DEFAULT_PREFIX)
    }

    pub fn with_prefix(medium: Arc<dyn StorageMedium>, prefix: impl Into<String>) -> Self {
        Self {
            medium,
            prefix: prefix.into(),
        }
    }

    /// Returns the medium key a logical key is stored under.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous record.
    ///
    /// # Arguments
    /// * `key` - Logical key, must not be empty
    /// * `value` - Any serializable value except one that serializes to null
    /// * `ttl_hours` - Optional lifetime in hours; None or zero = never expires
    ///
    /// # Errors
    /// `InvalidArgument` for an empty key or absent value, `StorageExhausted`
    /// when the medium is full.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_hours: Option<f64>,
    ) -> Result<()> {
        require_key(key)?;

        let value = serde_json::to_value(value).map_err(|err| {
            CacheError::InvalidArgument(format!("Value for '{key}' is not serializable: {err}"))
        })?;
        if value.is_null() {
            return Err(CacheError::InvalidArgument(format!(
                "Cannot store an absent value under '{key}'"
            )));
        }

        let record = StoredRecord::new(value, ttl_hours, current_timestamp_ms());
        let text = serde_json::to_string(&record)
            .map_err(|err| CacheError::Internal(format!("Failed to encode '{key}': {err}")))?;

        self.medium.set_item(&self.namespaced(key), &text)
    }

    // == Get ==
    /// Reads the value under `key`.
    ///
    /// Returns `Ok(None)` when the key is missing, expired, or holds data that
    /// does not decode into `T`; expired and undecodable records are deleted.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty key; medium read failures.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        require_key(key)?;

        let physical = self.namespaced(key);
        let Some(raw) = self.medium.get_item(&physical)? else {
            return Ok(None);
        };

        match decode(&raw, current_timestamp_ms()) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                debug!("Stored record expired: {}", physical);
                self.medium.remove_item(&physical)?;
                Ok(None)
            }
            Err(err) => {
                warn!("Dropping unreadable record {}: {}", physical, err);
                self.medium.remove_item(&physical)?;
                Ok(None)
            }
        }
    }

    // == Remove ==
    /// Deletes the record under `key`. Missing keys are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        require_key(key)?;
        self.medium.remove_item(&self.namespaced(key))
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Storage key cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Decodes a raw record: `Ok(None)` if it has expired at `now_ms`,
/// `CorruptRecord` if it is not a record or its value is not a `T`.
fn decode<T: DeserializeOwned>(raw: &str, now_ms: i64) -> Result<Option<T>> {
    let record: StoredRecord<Value> = serde_json::from_str(raw)
        .map_err(|err| CacheError::CorruptRecord(err.to_string()))?;

    if record.is_expired_at(now_ms) {
        return Ok(None);
    }

    serde_json::from_value(record.value)
        .map(Some)
        .map_err(|err| CacheError::CorruptRecord(err.to_string()))
}

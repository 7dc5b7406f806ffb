//! Stored Record Module
//!
//! The persisted shape of a value: `{"value": ..., "expiry": <ms>}` where a
//! missing `expiry` means the record never expires.

use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;

// == Stored Record ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    pub value: T,
    /// Absolute expiry time (Unix milliseconds), None = never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl<T> StoredRecord<T> {
    /// Creates a record expiring `ttl_hours` after `now_ms`.
    ///
    /// A missing, zero or NaN TTL produces a record without expiry. Negative
    /// TTLs produce an already expired record.
    pub fn new(value: T, ttl_hours: Option<f64>, now_ms: i64) -> Self {
        let expiry = ttl_hours
            .filter(|hours| *hours != 0.0 && !hours.is_nan())
            .map(|hours| now_ms.saturating_add((hours * MS_PER_HOUR).round() as i64));

        Self { value, expiry }
    }

    // == Is Expired ==
    /// A record is expired once `now_ms` reaches its expiry.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expiry.is_some_and(|expiry| now_ms >= expiry)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_without_ttl_has_no_expiry() {
        for ttl in [None, Some(0.0), Some(f64::NAN)] {
            let record = StoredRecord::new(1, ttl, 1_000);
            assert_eq!(record.expiry, None);
            assert!(!record.is_expired_at(i64::MAX));
        }
    }

    #[test]
    fn test_expiry_from_fractional_hours() {
        let record = StoredRecord::new("x", Some(0.0001), 1_000);
        assert_eq!(record.expiry, Some(1_360));

        let record = StoredRecord::new("x", Some(24.0), 0);
        assert_eq!(record.expiry, Some(86_400_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let record = StoredRecord {
            value: (),
            expiry: Some(500),
        };
        assert!(!record.is_expired_at(499));
        assert!(record.is_expired_at(500), "Record should be expired at boundary");
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let record = StoredRecord::new(1, Some(-1.0), 10_000_000);
        assert!(record.is_expired_at(10_000_000));
    }

    #[test]
    fn test_serialized_shape() {
        let permanent = StoredRecord::new(json!(["mew"]), None, 0);
        assert_eq!(serde_json::to_string(&permanent).unwrap(), r#"{"value":["mew"]}"#);

        let expiring = StoredRecord {
            value: json!({"id": 25}),
            expiry: Some(1_700_000_000_000),
        };
        assert_eq!(
            serde_json::to_string(&expiring).unwrap(),
            r#"{"value":{"id":25},"expiry":1700000000000}"#
        );
    }

    #[test]
    fn test_current_timestamp_is_monotonic_enough() {
        let first = current_timestamp_ms();
        let second = current_timestamp_ms();
        assert!(first > 1_600_000_000_000);
        assert!(second >= first);
    }
}

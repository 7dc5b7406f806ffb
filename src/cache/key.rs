//! Key Derivation Module
//!
//! Turns the argument value of a memoized call into the string key its
//! result is cached under.

use std::fmt::Debug;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Prefix of keys produced by the `Debug` fallback. JSON text never starts
/// with a letter other than `t`, `f` or `n`, so fallback keys cannot collide
/// with canonical ones.
pub const FALLBACK_KEY_PREFIX: &str = "debug:";

// == Key Strategy ==
/// Derives a cache key from call arguments.
///
/// Two calls whose arguments should share a cached result must map to the
/// same key; calls that must not share one must map to different keys.
pub trait KeyStrategy<A: ?Sized> {
    fn derive(&self, args: &A) -> String;
}

// == Canonical JSON ==
/// Default strategy: structural JSON serialization with object keys sorted.
///
/// Arguments that serialize to equal JSON values share a key regardless of
/// identity or map iteration order. When serialization fails (maps keyed by
/// non-strings, for instance) the key falls back to the `Debug` rendering
/// behind [`FALLBACK_KEY_PREFIX`]. Distinct values with identical `Debug`
/// output would then share a key.
///
/// Non-finite floats follow JSON and render as `null`: `NaN`, `inf`, `-inf`
/// and `None` all share a key. Wrap functions that take such floats with a
/// [`KeyFn`] that tells them apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalJson;

impl<A: Serialize + Debug + ?Sized> KeyStrategy<A> for CanonicalJson {
    fn derive(&self, args: &A) -> String {
        match serde_json::to_value(args) {
            Ok(value) => canonicalize(value).to_string(),
            Err(err) => {
                warn!("Memo key serialization failed, using Debug fallback: {}", err);
                format!("{FALLBACK_KEY_PREFIX}{args:?}")
            }
        }
    }
}

/// Rebuilds every object with its keys in sorted order, so the rendering is
/// stable even when serde_json preserves insertion order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

// == Key Function ==
/// Strategy backed by a caller-supplied function.
#[derive(Debug, Clone, Copy)]
pub struct KeyFn<F>(pub F);

impl<A: ?Sized, F: Fn(&A) -> String> KeyStrategy<A> for KeyFn<F> {
    fn derive(&self, args: &A) -> String {
        (self.0)(args)
    }
}

/// Wraps a closure as a [`KeyStrategy`].
pub fn key_fn<A: ?Sized, F: Fn(&A) -> String>(f: F) -> KeyFn<F> {
    KeyFn(f)
}

//! Shared helpers for reading numbers out of loosely-typed provider JSON.
//!
//! The provider is inconsistent about representation as well as naming: the
//! same field may arrive as a JSON number, a numeric string, or `null`.
//!
//! - `json_to_f64`: one value → `Option<f64>`
//! - `first_f64`: first present value along an alias chain
//!
//! Non-finite inputs (NaN, ±Inf) are treated as absent.

use serde_json::{Map, Value};

/// Convert a JSON value to a finite f64, or `None` if it isn't numeric.
pub(crate) fn json_to_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        tracing::warn!("json_to_f64 received non-finite value {}, ignoring", n);
        return None;
    }
    Some(n)
}

/// Return the first key in `keys` whose value is numeric.
///
/// Keys are tried in order, so the primary spelling goes first and aliases
/// after it.
pub(crate) fn first_f64(record: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(json_to_f64)
}

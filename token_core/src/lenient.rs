//! Field deserializers that never fail.
//!
//! The backend feed is loosely typed: numbers sometimes arrive as strings,
//! timestamps as epoch numbers, flags as `0`/`1`. Helpers here map anything
//! they cannot interpret to "absent" instead of rejecting the record, except
//! [`f64_or_nan`], which keeps "present but unreadable" distinguishable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Like [`f64_opt`], but a present value that is not a number reads as NaN.
///
/// Used for fields that gate a record: NaN fails every tolerance comparison,
/// while a missing or `null` value stays `None`.
pub fn f64_or_nan<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Some(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    })
}

pub fn u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_to_count)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_count))
        }
        _ => None,
    };
    Ok(parsed)
}

pub fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    })
}

fn float_to_count(v: f64) -> Option<u64> {
    if v.is_finite() && v >= 0.0 {
        Some(v.trunc() as u64)
    } else {
        None
    }
}

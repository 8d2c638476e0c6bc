use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::lenient;

/// One observed market entry as served by the backend token feed.
///
/// Every field is optional on the wire. Values that cannot be interpreted are
/// read as absent so a single bad field never costs the whole record. The
/// developer holdings share is the exception, see [`TokenRecord::dev_holds_percent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub pair_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub token_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub token_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub token_ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub token_image: Option<String>,

    /// Volume in the chain's native unit
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub volume_sol: Option<f64>,
    /// Market capitalization in the chain's native unit
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub market_cap_sol: Option<f64>,
    /// Liquidity in the chain's native unit
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub liquidity_sol: Option<f64>,

    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub num_txns: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub num_buys: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub num_sells: Option<u64>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub top10_holders_percent: Option<f64>,
    /// NaN when present but unreadable
    #[serde(default, deserialize_with = "lenient::f64_or_nan")]
    pub dev_holds_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub snipers_hold_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub insiders_hold_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub bundlers_hold_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub num_holders: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub num_trading_bot_users: Option<u64>,

    /// Creation time, see [`parse_timestamp`] for accepted forms
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub created_at: Option<String>,
    /// Trading-open time, see [`parse_timestamp`] for accepted forms
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub open_trading: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub telegram: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub dex_paid: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_pump_live: bool,
}

impl TokenRecord {
    /// Deduplication key: lowercased, trimmed ticker. `None` when blank.
    pub fn ticker_key(&self) -> Option<String> {
        let key = self.token_ticker.as_deref()?.trim().to_lowercase();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// Trading-open time when parseable, else creation time.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.open_trading
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.created_at.as_deref().and_then(parse_timestamp))
    }
}

/// Zone-less layouts the backend has been seen to emit; read as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a feed timestamp.
///
/// Accepts RFC 3339, integer epoch milliseconds, zone-less date-times with a
/// `T` or space separator, and bare `YYYY-MM-DD` dates. Zone-less values are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Decode the `data` array of a feed envelope.
///
/// Entries that are not JSON objects are dropped; the second element of the
/// result counts them.
pub fn parse_records(values: Vec<Value>) -> (Vec<TokenRecord>, usize) {
    let mut records = Vec::with_capacity(values.len());
    let mut dropped = 0;

    for value in values {
        if !value.is_object() {
            dropped += 1;
            continue;
        }
        match serde_json::from_value::<TokenRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Dropping unreadable token record: {}", e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} malformed token records", dropped);
    }

    (records, dropped)
}

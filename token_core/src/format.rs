use chrono::{DateTime, Utc};

use crate::record::parse_timestamp;
use crate::TokenRecord;

/// Compact USD label used for dashboard totals: `$1.23M`, `$4.6K`, `$7.89`.
pub fn format_usd_compact(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// Ticker price label. Same bands as [`format_usd_compact`], two decimals throughout.
pub fn format_price_label(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// Age label for a feed timestamp: `Nm`, `Nh`, `Nd`, or whole months with an `m` suffix.
///
/// Returns `None` when the timestamp cannot be parsed. Timestamps in the
/// future read as `0m`.
pub fn format_time_ago(raw: &str, now: DateTime<Utc>) -> Option<String> {
    parse_timestamp(raw).map(|then| age_label(then, now))
}

/// Age of a token by the same date the list is sorted on.
pub fn format_token_age(token: &TokenRecord, now: DateTime<Utc>) -> Option<String> {
    token.effective_date().map(|then| age_label(then, now))
}

fn age_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(then).num_minutes().max(0);
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 60 {
        format!("{}m", minutes)
    } else if hours < 24 {
        format!("{}h", hours)
    } else if days < 30 {
        format!("{}d", days)
    } else {
        format!("{}m", days / 30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_usd_compact_bands() {
        assert_eq!(format_usd_compact(2_345_678.0), "$2.35M");
        assert_eq!(format_usd_compact(1_000_000.0), "$1.00M");
        assert_eq!(format_usd_compact(45_678.0), "$45.7K");
        assert_eq!(format_usd_compact(1_000.0), "$1.0K");
        assert_eq!(format_usd_compact(999.994), "$999.99");
        assert_eq!(format_usd_compact(0.0), "$0.00");
        assert_eq!(format_usd_compact(f64::NAN), "$0.00");
    }

    #[test]
    fn test_price_label_two_decimals() {
        assert_eq!(format_price_label(1_234_567.0), "$1.23M");
        assert_eq!(format_price_label(4_560.0), "$4.56K");
        assert_eq!(format_price_label(7.891), "$7.89");
    }

    #[test]
    fn test_time_ago_bands() {
        let now = Utc.with_ymd_and_hms(2025, 8, 19, 12, 0, 0).unwrap();
        let ago = |d: Duration| (now - d).to_rfc3339();

        assert_eq!(format_time_ago(&ago(Duration::minutes(5)), now).as_deref(), Some("5m"));
        assert_eq!(format_time_ago(&ago(Duration::minutes(59)), now).as_deref(), Some("59m"));
        assert_eq!(format_time_ago(&ago(Duration::minutes(60)), now).as_deref(), Some("1h"));
        assert_eq!(format_time_ago(&ago(Duration::hours(23)), now).as_deref(), Some("23h"));
        assert_eq!(format_time_ago(&ago(Duration::days(3)), now).as_deref(), Some("3d"));
        assert_eq!(format_time_ago(&ago(Duration::days(65)), now).as_deref(), Some("2m"));
    }

    #[test]
    fn test_time_ago_accepts_epoch_millis_and_clamps_future() {
        let now = Utc.with_ymd_and_hms(2025, 8, 19, 12, 0, 0).unwrap();
        let two_hours_ago = (now - Duration::hours(2)).timestamp_millis().to_string();
        assert_eq!(format_time_ago(&two_hours_ago, now).as_deref(), Some("2h"));

        let future = (now + Duration::hours(1)).to_rfc3339();
        assert_eq!(format_time_ago(&future, now).as_deref(), Some("0m"));

        assert_eq!(format_time_ago("yesterday", now), None);
    }

    #[test]
    fn test_token_age_uses_effective_date() {
        let now = Utc.with_ymd_and_hms(2025, 8, 19, 12, 0, 0).unwrap();
        let token = TokenRecord {
            open_trading: Some("broken".to_string()),
            created_at: Some("2025-08-16T12:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(format_token_age(&token, now).as_deref(), Some("3d"));
        assert_eq!(format_token_age(&TokenRecord::default(), now), None);
    }
}

pub mod dedup;
pub mod filter;
pub mod format;
pub mod lenient;
pub mod normalizer;
pub mod record;
pub mod sorter;
pub mod summary;
pub mod window;

pub use dedup::{deduplicate, Deduplicated};
pub use filter::{has_zero_dev_holdings, retain_zero_dev_holdings, DEV_HOLDS_EPSILON};
pub use format::{format_price_label, format_time_ago, format_token_age, format_usd_compact};
pub use normalizer::{normalize, MAX_SNIPERS_HOLD_PERCENT};
pub use record::{parse_records, parse_timestamp, TokenRecord};
pub use sorter::sort_by_recency;
pub use summary::SummaryStats;
pub use window::{TokenWindow, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Counts gathered while reconciling one raw feed payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub received: usize,
    pub clamped: usize,
    pub empty_ticker: usize,
    pub duplicates_collapsed: usize,
    pub dev_filtered: usize,
    pub published: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub tokens: Vec<TokenRecord>,
    pub report: ReconcileReport,
}

/// Turn a raw feed list into the clean list: clamp, deduplicate, filter, sort.
pub fn reconcile(raw: Vec<TokenRecord>) -> Reconciled {
    let mut report = ReconcileReport {
        received: raw.len(),
        ..Default::default()
    };

    let mut tokens = raw;
    report.clamped = normalize(&mut tokens);

    let deduplicated = deduplicate(tokens);
    report.empty_ticker = deduplicated.empty_ticker;
    report.duplicates_collapsed = deduplicated.collapsed;

    let mut tokens = deduplicated.tokens;
    report.dev_filtered = retain_zero_dev_holdings(&mut tokens);
    sort_by_recency(&mut tokens);
    report.published = tokens.len();

    debug!(
        "Reconciled {} records into {} (clamped: {}, no ticker: {}, duplicates: {}, dev holdings: {})",
        report.received,
        report.published,
        report.clamped,
        report.empty_ticker,
        report.duplicates_collapsed,
        report.dev_filtered
    );

    Reconciled { tokens, report }
}

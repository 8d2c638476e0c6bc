use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::TokenRecord;

/// Order by effective date descending, then volume descending.
///
/// Records without any parseable date go last. The sort is stable, so records
/// with equal keys keep their incoming order.
pub fn sort_by_recency(tokens: &mut Vec<TokenRecord>) {
    let mut keyed: Vec<(Option<DateTime<Utc>>, f64, TokenRecord)> = tokens
        .drain(..)
        .map(|token| (token.effective_date(), token.volume_sol.unwrap_or(0.0), token))
        .collect();

    keyed.sort_by(|a, b| compare_keys((a.0, a.1), (b.0, b.1)));

    tokens.extend(keyed.into_iter().map(|(_, _, token)| token));
}

fn compare_keys(a: (Option<DateTime<Utc>>, f64), b: (Option<DateTime<Utc>>, f64)) -> Ordering {
    let by_date = match (a.0, b.0) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| b.1.total_cmp(&a.1))
}

use crate::TokenRecord;

/// Developer holdings below this magnitude count as zero.
pub const DEV_HOLDS_EPSILON: f64 = 1e-4;

/// True when the developer holds no meaningful share of supply.
///
/// Absent values pass; the backend omits the field for tokens it could not
/// attribute to a developer wallet. Unreadable values arrive as NaN and fail.
pub fn has_zero_dev_holdings(token: &TokenRecord) -> bool {
    token
        .dev_holds_percent
        .map_or(true, |percent| percent.abs() < DEV_HOLDS_EPSILON)
}

/// Drop records with non-zero developer holdings. Returns how many were removed.
pub fn retain_zero_dev_holdings(tokens: &mut Vec<TokenRecord>) -> usize {
    let before = tokens.len();
    tokens.retain(has_zero_dev_holdings);
    before - tokens.len()
}

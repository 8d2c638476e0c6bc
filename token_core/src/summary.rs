use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::format_usd_compact;
use crate::TokenRecord;

/// Aggregate figures shown above a feed's token list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Sum of market caps converted to USD
    pub total_market_cap_usd: Decimal,
    /// Sum of volumes converted to USD
    pub total_volume_usd: Decimal,
    /// Tokens currently flagged as live
    pub active_tokens: usize,
    pub total_tokens: usize,
}

impl SummaryStats {
    /// Compute totals for a clean list, converting native amounts at `native_usd_price`.
    pub fn from_tokens(tokens: &[TokenRecord], native_usd_price: f64) -> Self {
        let mut stats = SummaryStats {
            total_tokens: tokens.len(),
            ..Default::default()
        };

        for token in tokens {
            if let Some(cap) = token.market_cap_sol {
                stats.total_market_cap_usd = stats
                    .total_market_cap_usd
                    .saturating_add(to_usd(cap, native_usd_price));
            }
            if let Some(volume) = token.volume_sol {
                stats.total_volume_usd = stats
                    .total_volume_usd
                    .saturating_add(to_usd(volume, native_usd_price));
            }
            if token.is_pump_live {
                stats.active_tokens += 1;
            }
        }

        stats
    }

    pub fn market_cap_label(&self) -> String {
        format_usd_compact(self.total_market_cap_usd.to_f64().unwrap_or(0.0))
    }

    pub fn volume_label(&self) -> String {
        format_usd_compact(self.total_volume_usd.to_f64().unwrap_or(0.0))
    }
}

fn to_usd(native_amount: f64, native_usd_price: f64) -> Decimal {
    Decimal::from_f64_retain(native_amount * native_usd_price)
        .map(|usd| usd.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

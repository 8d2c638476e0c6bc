use crate::TokenRecord;

/// Upper bound for `snipersHoldPercent`. Larger readings are clamped, never dropped.
pub const MAX_SNIPERS_HOLD_PERCENT: f64 = 3.323437761849493;

/// Clamp out-of-range fields in place. Returns how many records were changed.
///
/// Idempotent: a second pass over the same slice changes nothing.
pub fn normalize(tokens: &mut [TokenRecord]) -> usize {
    let mut clamped = 0;
    for token in tokens.iter_mut() {
        if let Some(snipers) = token.snipers_hold_percent {
            if snipers > MAX_SNIPERS_HOLD_PERCENT {
                token.snipers_hold_percent = Some(MAX_SNIPERS_HOLD_PERCENT);
                clamped += 1;
            }
        }
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_snipers(value: Option<f64>) -> TokenRecord {
        TokenRecord {
            token_ticker: Some("SNP".to_string()),
            snipers_hold_percent: value,
            market_cap_sol: Some(12.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_clamps_only_values_above_ceiling() {
        let mut tokens = vec![
            with_snipers(Some(87.5)),
            with_snipers(Some(MAX_SNIPERS_HOLD_PERCENT)),
            with_snipers(Some(1.2)),
            with_snipers(None),
        ];

        let clamped = normalize(&mut tokens);

        assert_eq!(clamped, 1);
        assert_eq!(tokens[0].snipers_hold_percent, Some(MAX_SNIPERS_HOLD_PERCENT));
        assert_eq!(tokens[1].snipers_hold_percent, Some(MAX_SNIPERS_HOLD_PERCENT));
        assert_eq!(tokens[2].snipers_hold_percent, Some(1.2));
        assert_eq!(tokens[3].snipers_hold_percent, None);
        // untouched fields pass through
        assert!(tokens.iter().all(|t| t.market_cap_sol == Some(12.0)));
    }

    #[test]
    fn test_normalizing_twice_is_a_no_op() {
        let mut tokens: Vec<TokenRecord> = [0.0, 3.4, 99.0, 3.3, 1e9]
            .iter()
            .map(|v| with_snipers(Some(*v)))
            .collect();

        normalize(&mut tokens);
        let once = tokens.clone();
        assert_eq!(normalize(&mut tokens), 0);
        assert_eq!(tokens, once);

        for token in &tokens {
            assert!(token.snipers_hold_percent.unwrap() <= MAX_SNIPERS_HOLD_PERCENT);
        }
    }
}

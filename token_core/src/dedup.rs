use std::collections::HashMap;

use crate::TokenRecord;

/// Result of collapsing a raw list down to one record per ticker.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// Surviving records, in first-seen order of their ticker
    pub tokens: Vec<TokenRecord>,
    /// Records skipped for a missing or blank ticker
    pub empty_ticker: usize,
    /// Records that lost to another record with the same ticker
    pub collapsed: usize,
}

/// Keep one record per `lowercase(trim(ticker))`, preferring the larger market cap.
///
/// On an exact market-cap tie the record encountered first wins. A missing
/// market cap ranks below any present value.
pub fn deduplicate(tokens: Vec<TokenRecord>) -> Deduplicated {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(tokens.len());
    let mut result = Deduplicated {
        tokens: Vec::with_capacity(tokens.len()),
        ..Default::default()
    };

    for token in tokens {
        let Some(key) = token.ticker_key() else {
            result.empty_ticker += 1;
            continue;
        };

        match slots.get(&key) {
            Some(&index) => {
                result.collapsed += 1;
                if market_cap_rank(&token) > market_cap_rank(&result.tokens[index]) {
                    result.tokens[index] = token;
                }
            }
            None => {
                slots.insert(key, result.tokens.len());
                result.tokens.push(token);
            }
        }
    }

    result
}

fn market_cap_rank(token: &TokenRecord) -> f64 {
    token.market_cap_sol.unwrap_or(f64::NEG_INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn token(ticker: &str, cap: Option<f64>, address: &str) -> TokenRecord {
        TokenRecord {
            token_ticker: Some(ticker.to_string()),
            token_address: Some(address.to_string()),
            market_cap_sol: cap,
            ..Default::default()
        }
    }

    #[test]
    fn test_case_insensitive_keeps_larger_cap() {
        let result = deduplicate(vec![
            token("AAA", Some(10.0), "first"),
            token("aaa", Some(50.0), "second"),
            token("", Some(5.0), "blank"),
        ]);

        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].token_address.as_deref(), Some("second"));
        assert_eq!(result.tokens[0].token_ticker.as_deref(), Some("aaa"));
        assert_eq!(result.empty_ticker, 1);
        assert_eq!(result.collapsed, 1);
    }

    #[test]
    fn test_equal_caps_keep_first_seen() {
        let result = deduplicate(vec![
            token("Dup", Some(20.0), "first"),
            token(" dup ", Some(20.0), "second"),
        ]);
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].token_address.as_deref(), Some("first"));
    }

    #[test]
    fn test_present_cap_beats_missing_cap() {
        let result = deduplicate(vec![
            token("MIS", None, "missing"),
            token("mis", Some(0.5), "present"),
            token("MIS", None, "missing-again"),
        ]);
        assert_eq!(result.tokens[0].token_address.as_deref(), Some("present"));
    }

    #[test]
    fn test_whitespace_and_missing_tickers_are_excluded() {
        let no_ticker = TokenRecord {
            market_cap_sol: Some(999.0),
            ..Default::default()
        };
        let result = deduplicate(vec![token("   ", Some(1.0), "ws"), no_ticker]);
        assert!(result.tokens.is_empty());
        assert_eq!(result.empty_ticker, 2);
    }

    #[test]
    fn test_uniqueness_and_maximality() {
        let caps = [3.0, 7.0, 1.0, 7.5, 2.0, 9.0, 4.0, 0.5, 6.0];
        let tickers = ["ab", "AB", "cd", " ab", "Cd", "ef", "EF ", "cd", "gh"];
        let input: Vec<TokenRecord> = tickers
            .iter()
            .zip(caps.iter())
            .enumerate()
            .map(|(i, (t, c))| token(t, Some(*c), &format!("addr{}", i)))
            .collect();

        let result = deduplicate(input.clone());

        let keys: Vec<String> = result.tokens.iter().filter_map(|t| t.ticker_key()).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), result.tokens.len());
        assert_eq!(unique.len(), keys.len());

        for survivor in &result.tokens {
            let key = survivor.ticker_key().unwrap();
            let group_max = input
                .iter()
                .filter(|t| t.ticker_key().as_deref() == Some(key.as_str()))
                .filter_map(|t| t.market_cap_sol)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(survivor.market_cap_sol, Some(group_max));
        }

        // first-seen slot order: ab, cd, ef, gh
        assert_eq!(keys, vec!["ab", "cd", "ef", "gh"]);
    }
}

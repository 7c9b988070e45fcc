//! Built-in quote table used when no price file is configured.

use crate::ports::quote_port::{Quote, QuotePort};

const MOCK_QUOTES: &[(&str, &str, f64)] = &[
    ("AAPL", "Apple Inc.", 180.00),
    ("GOOGL", "Alphabet Inc.", 2800.00),
    ("TSLA", "Tesla Inc.", 700.00),
    ("MSFT", "Microsoft Corporation", 380.00),
    ("NVDA", "NVIDIA Corporation", 435.00),
    ("AMZN", "Amazon.com Inc.", 145.50),
    ("META", "Meta Platforms Inc.", 325.00),
    ("NFLX", "Netflix Inc.", 485.00),
    ("JPM", "JPMorgan Chase & Co.", 155.80),
    ("V", "Visa Inc.", 275.50),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MockQuoteAdapter;

impl QuotePort for MockQuoteAdapter {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        let symbol = symbol.trim().to_uppercase();
        MOCK_QUOTES
            .iter()
            .find(|(s, _, _)| *s == symbol)
            .map(|&(s, name, price)| Quote {
                symbol: s.to_string(),
                name: name.to_string(),
                price,
            })
    }

    fn symbols(&self) -> Vec<String> {
        MOCK_QUOTES.iter().map(|(s, _, _)| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbol_quotes() {
        let q = MockQuoteAdapter.quote("aapl").unwrap();
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.name, "Apple Inc.");
        assert!((q.price - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_symbol_has_no_quote() {
        assert!(MockQuoteAdapter.quote("ZZZZ").is_none());
    }

    #[test]
    fn prices_skip_unknown_symbols() {
        let prices = MockQuoteAdapter.prices(&["TSLA".to_string(), "ZZZZ".to_string()]);
        assert_eq!(prices.len(), 1);
        assert!((prices["TSLA"] - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lists_all_symbols() {
        let symbols = MockQuoteAdapter.symbols();
        assert_eq!(symbols.len(), 10);
        assert!(symbols.contains(&"JPM".to_string()));
    }
}

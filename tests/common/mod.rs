#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use papertrade::ports::quote_port::{Quote, QuotePort};
use std::collections::HashMap;
use std::io::Write;

/// Fixed clock for deterministic timestamps.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 16, 14, 30, 0).unwrap() + Duration::minutes(minutes)
}

pub fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(s, p)| (s.to_string(), *p))
        .collect()
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Quote source backed by a fixed table; prices can be changed between trades.
pub struct TableQuotes {
    pub quotes: HashMap<String, Quote>,
}

impl TableQuotes {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
        }
    }

    pub fn with_quote(mut self, symbol: &str, name: &str, price: f64) -> Self {
        self.set_price(symbol, name, price);
        self
    }

    pub fn set_price(&mut self, symbol: &str, name: &str, price: f64) {
        self.quotes.insert(
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                name: name.to_string(),
                price,
            },
        );
    }
}

impl QuotePort for TableQuotes {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(&symbol.trim().to_uppercase()).cloned()
    }

    fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.quotes.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

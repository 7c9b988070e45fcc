//! Price lookup port.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
}

pub trait QuotePort {
    fn quote(&self, symbol: &str) -> Option<Quote>;

    fn symbols(&self) -> Vec<String>;

    /// Price map for `symbols`; symbols without a quote are left out.
    fn prices(&self, symbols: &[String]) -> HashMap<String, f64> {
        symbols
            .iter()
            .filter_map(|s| self.quote(s).map(|q| (q.symbol, q.price)))
            .collect()
    }
}

//! Portfolio aggregates derived from a set of holdings.

use serde::{Deserialize, Serialize};

use super::holding::Holding;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub total_value: f64,
    pub total_invested: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub holdings: Vec<Holding>,
    /// Symbols valued at their last known price because no quote was supplied.
    #[serde(default)]
    pub stale_symbols: Vec<String>,
}

impl Portfolio {
    pub fn get_holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn has_holding(&self, symbol: &str) -> bool {
        self.get_holding(symbol).is_some()
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn has_stale_prices(&self) -> bool {
        !self.stale_symbols.is_empty()
    }
}

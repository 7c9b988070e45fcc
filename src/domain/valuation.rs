//! Portfolio valuation.
//!
//! Revalues every holding against a price map and rolls the results up into
//! portfolio totals. Pure: the input holdings are never modified and the same
//! inputs always produce the same output.

use std::collections::HashMap;

use super::holding::Holding;
use super::portfolio::Portfolio;

/// Revalue `holdings` at `prices` and aggregate.
///
/// A holding whose symbol is missing from `prices` keeps its last
/// `current_price` and is listed in [`Portfolio::stale_symbols`].
/// Percentages are 0 when nothing is invested.
pub fn compute_portfolio_valuation(
    holdings: &[Holding],
    prices: &HashMap<String, f64>,
) -> Portfolio {
    let mut stale_symbols = Vec::new();

    let revalued: Vec<Holding> = holdings
        .iter()
        .map(|holding| match prices.get(&holding.symbol) {
            Some(&price) => holding.revalue(price),
            None => {
                stale_symbols.push(holding.symbol.clone());
                holding.revalue(holding.current_price)
            }
        })
        .collect();

    if !stale_symbols.is_empty() {
        tracing::warn!(symbols = ?stale_symbols, "no quote supplied, using last known price");
    }

    let total_value: f64 = revalued.iter().map(|h| h.current_value).sum();
    let total_invested: f64 = revalued.iter().map(Holding::invested).sum();
    let profit_loss = total_value - total_invested;
    let profit_loss_percent = if total_invested > 0.0 {
        profit_loss / total_invested * 100.0
    } else {
        0.0
    };

    Portfolio {
        total_value,
        total_invested,
        profit_loss,
        profit_loss_percent,
        holdings: revalued,
        stale_symbols,
    }
}

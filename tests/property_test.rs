//! Property tests for valuation and trade validation.

mod common;

use common::at;
use papertrade::adapters::memory_adapter::InMemoryLedger;
use papertrade::domain::error::TradeRejection;
use papertrade::domain::execution::execute_trade;
use papertrade::domain::holding::Holding;
use papertrade::domain::transaction::TradeRequest;
use papertrade::domain::validation::{clamp_share_input, validate_trade};
use papertrade::domain::valuation::compute_portfolio_valuation;
use papertrade::ports::ledger_port::LedgerPort;
use proptest::prelude::*;
use std::collections::HashMap;

const SYMBOLS: &[&str] = &["AAPL", "GOOGL", "TSLA", "MSFT", "NVDA", "AMZN"];

fn holdings_strategy() -> impl Strategy<Value = Vec<Holding>> {
    proptest::sample::subsequence(SYMBOLS.to_vec(), 0..=SYMBOLS.len()).prop_flat_map(|symbols| {
        let n = symbols.len();
        (
            Just(symbols),
            proptest::collection::vec((1u64..1_000, 1.0f64..5_000.0), n),
        )
            .prop_map(|(symbols, params)| {
                symbols
                    .into_iter()
                    .zip(params)
                    .map(|(s, (shares, cost))| Holding::open(s, "", shares, cost, at(0)))
                    .collect()
            })
    })
}

fn price_map_strategy() -> impl Strategy<Value = HashMap<String, f64>> {
    proptest::collection::hash_map(
        proptest::sample::select(SYMBOLS.to_vec()).prop_map(|s| s.to_string()),
        1.0f64..5_000.0,
        0..SYMBOLS.len(),
    )
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn aggregates_match_holdings(holdings in holdings_strategy(), prices in price_map_strategy()) {
        let portfolio = compute_portfolio_valuation(&holdings, &prices);

        prop_assert_eq!(portfolio.holdings.len(), holdings.len());
        let value: f64 = portfolio.holdings.iter().map(|h| h.current_value).sum();
        let invested: f64 = holdings.iter().map(|h| h.shares as f64 * h.average_cost).sum();
        prop_assert!(close(portfolio.total_value, value));
        prop_assert!(close(portfolio.total_invested, invested));
        prop_assert!(close(portfolio.profit_loss, portfolio.total_value - portfolio.total_invested));

        for h in &portfolio.holdings {
            prop_assert!(close(h.unrealized_pl, h.current_value - h.shares as f64 * h.average_cost));
            prop_assert_eq!(
                portfolio.stale_symbols.contains(&h.symbol),
                !prices.contains_key(&h.symbol)
            );
        }
    }

    #[test]
    fn valuation_is_idempotent(holdings in holdings_strategy(), prices in price_map_strategy()) {
        let once = compute_portfolio_valuation(&holdings, &prices);
        let twice = compute_portfolio_valuation(&once.holdings, &prices);
        prop_assert_eq!(once.holdings, twice.holdings);
        prop_assert!(close(once.total_value, twice.total_value));
    }

    #[test]
    fn buy_is_allowed_exactly_when_affordable(
        shares in 1u64..500,
        price in 0.01f64..3_000.0,
        balance in 0.0f64..100_000.0,
    ) {
        let request = TradeRequest::buy("AAPL", shares, price);
        let result = validate_trade(&request, balance, None);
        if request.total_cost() > balance {
            let is_balance_rejection = matches!(result, Err(TradeRejection::InsufficientBalance { .. }));
            prop_assert!(is_balance_rejection);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn sell_is_allowed_exactly_when_held(
        held in 1u64..500,
        requested in 1u64..1_000,
        price in 0.01f64..1e6,
        balance in 0.0f64..1e9,
    ) {
        let holding = Holding::open("TSLA", "Tesla Inc.", held, 700.0, at(0));
        let request = TradeRequest::sell("TSLA", requested, price);
        let result = validate_trade(&request, balance, Some(&holding));
        prop_assert_eq!(result.is_ok(), requested <= held);
    }

    #[test]
    fn clamped_input_is_never_zero(raw in ".{0,12}") {
        prop_assert!(clamp_share_input(&raw) >= 1);
    }

    #[test]
    fn cash_plus_cost_basis_is_conserved_by_buys(
        trades in proptest::collection::vec((0usize..SYMBOLS.len(), 1u64..20, 1.0f64..500.0), 1..15)
    ) {
        let mut ledger = InMemoryLedger::new(25_000.0);
        for (i, (idx, shares, price)) in trades.into_iter().enumerate() {
            let request = TradeRequest::buy(SYMBOLS[idx], shares, price);
            let _ = execute_trade(&mut ledger, &HashMap::new(), &request, at(i as i64));
        }
        let cash = ledger.read_balance().unwrap();
        let basis: f64 = ledger.read_holdings().unwrap().iter().map(|h| h.invested()).sum();
        prop_assert!(cash >= 0.0);
        prop_assert!(close(cash + basis, 25_000.0));
    }
}

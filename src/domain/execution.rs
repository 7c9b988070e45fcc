//! Trade execution.
//!
//! A trade is read, validated, planned in memory and then handed to the
//! ledger as a single [`LedgerCommit`]. Nothing is written unless validation
//! passes, and a failed commit leaves the ledger as it was.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::error::PaperTradeError;
use super::holding::Holding;
use super::portfolio::Portfolio;
use super::transaction::{TradeRequest, TradeType, Transaction};
use super::validation::validate_trade;
use super::valuation::compute_portfolio_valuation;
use crate::ports::ledger_port::{LedgerCommit, LedgerPort};

/// State changes produced by one trade, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TradePlan {
    pub commit: LedgerCommit,
    /// `None` when the trade sold the whole position.
    pub updated_holding: Option<Holding>,
    /// Gain or loss locked in by a SELL against the average cost.
    pub realized_pl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub transaction: Transaction,
    pub updated_balance: f64,
    pub updated_holding: Option<Holding>,
    pub realized_pl: Option<f64>,
    pub portfolio: Portfolio,
}

/// Work out the new balance, holdings and log entry for an already
/// validated request.
///
/// `request` must have passed [`validate_trade`]: an unchecked oversell
/// would credit the full proceeds and drop the holding.
///
/// Steps:
/// 1. Record the transaction at `now`
/// 2. BUY debits `shares * price`, SELL credits it
/// 3. BUY opens a holding or reweights the average cost of the existing one
/// 4. SELL reduces shares, dropping the holding when none remain
/// 5. The touched holding is revalued at the trade price
pub fn plan_trade(
    request: &TradeRequest,
    balance: f64,
    holdings: &[Holding],
    now: DateTime<Utc>,
) -> TradePlan {
    let transaction = Transaction::record(request, now);
    let total_cost = transaction.total_cost;
    let existing = holdings.iter().find(|h| h.symbol == request.symbol);

    let (balance, updated_holding, realized_pl) = match request.trade_type {
        TradeType::Buy => {
            let holding = match existing {
                Some(h) => h.with_purchase(request.shares, total_cost),
                None => Holding::open(
                    &request.symbol,
                    &request.company_name,
                    request.shares,
                    request.price,
                    now,
                ),
            };
            (balance - total_cost, Some(holding.revalue(request.price)), None)
        }
        TradeType::Sell => {
            let average_cost = existing.map_or(request.price, |h| h.average_cost);
            let realized = request.shares as f64 * (request.price - average_cost);
            let holding = existing
                .and_then(|h| h.with_sale(request.shares))
                .map(|h| h.revalue(request.price));
            (balance + total_cost, holding, Some(realized))
        }
    };

    let mut new_holdings: Vec<Holding> = holdings
        .iter()
        .filter(|h| h.symbol != request.symbol)
        .cloned()
        .collect();
    if let Some(ref holding) = updated_holding {
        match holdings.iter().position(|h| h.symbol == request.symbol) {
            Some(idx) => new_holdings.insert(idx, holding.clone()),
            None => new_holdings.push(holding.clone()),
        }
    }

    TradePlan {
        commit: LedgerCommit {
            holdings: new_holdings,
            balance,
            transaction,
        },
        updated_holding,
        realized_pl,
    }
}

/// Validate and execute `request` against `ledger`, then revalue the
/// portfolio at `prices`.
///
/// The ledger is borrowed mutably for the whole call, so a second trade
/// cannot start while this one is in flight.
pub fn execute_trade(
    ledger: &mut dyn LedgerPort,
    prices: &HashMap<String, f64>,
    request: &TradeRequest,
    now: DateTime<Utc>,
) -> Result<TradeOutcome, PaperTradeError> {
    let balance = ledger.read_balance()?;
    let holdings = ledger.read_holdings()?;
    let existing = holdings.iter().find(|h| h.symbol == request.symbol);

    if let Err(rejection) = validate_trade(request, balance, existing) {
        tracing::warn!(
            trade_type = %request.trade_type,
            symbol = %request.symbol,
            shares = request.shares,
            price = request.price,
            %rejection,
            "trade rejected"
        );
        return Err(rejection.into());
    }

    let plan = plan_trade(request, balance, &holdings, now);

    if let Err(e) = ledger.commit(&plan.commit) {
        tracing::warn!(
            symbol = %request.symbol,
            error = %e,
            "trade commit failed, nothing written"
        );
        return Err(e);
    }

    tracing::info!(
        id = %plan.commit.transaction.id,
        trade_type = %request.trade_type,
        symbol = %request.symbol,
        shares = request.shares,
        price = request.price,
        balance = plan.commit.balance,
        realized_pl = ?plan.realized_pl,
        "trade executed"
    );

    let portfolio = compute_portfolio_valuation(&plan.commit.holdings, prices);
    let updated_holding = plan
        .updated_holding
        .and_then(|h| portfolio.get_holding(&h.symbol).cloned());

    Ok(TradeOutcome {
        transaction: plan.commit.transaction,
        updated_balance: plan.commit.balance,
        updated_holding,
        realized_pl: plan.realized_pl,
        portfolio,
    })
}

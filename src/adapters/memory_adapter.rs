//! In-memory ledger, for tests and throwaway sessions.

use crate::domain::error::PaperTradeError;
use crate::domain::holding::Holding;
use crate::domain::transaction::Transaction;
use crate::ports::ledger_port::{LedgerCommit, LedgerPort};

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balance: f64,
    holdings: Vec<Holding>,
    transactions: Vec<Transaction>,
    pending_failure: Option<String>,
}

impl InMemoryLedger {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            balance: starting_balance,
            ..Default::default()
        }
    }

    /// Make the next `commit` fail with `reason` without applying anything.
    pub fn fail_next_commit(&mut self, reason: &str) {
        self.pending_failure = Some(reason.to_string());
    }
}

impl LedgerPort for InMemoryLedger {
    fn read_holdings(&self) -> Result<Vec<Holding>, PaperTradeError> {
        Ok(self.holdings.clone())
    }

    fn read_balance(&self) -> Result<f64, PaperTradeError> {
        Ok(self.balance)
    }

    fn read_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>, PaperTradeError> {
        Ok(self
            .transactions
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn commit(&mut self, commit: &LedgerCommit) -> Result<(), PaperTradeError> {
        if let Some(reason) = self.pending_failure.take() {
            return Err(PaperTradeError::persistence(reason));
        }
        self.holdings = commit.holdings.clone();
        self.balance = commit.balance;
        self.transactions.push(commit.transaction.clone());
        Ok(())
    }

    fn reset(&mut self, starting_balance: f64) -> Result<(), PaperTradeError> {
        *self = Self::new(starting_balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TradeRequest;
    use chrono::{Duration, TimeZone, Utc};

    fn commit_for(symbol: &str, minutes: i64, balance: f64) -> LedgerCommit {
        let ts = Utc.with_ymd_and_hms(2024, 10, 16, 15, 30, 0).unwrap() + Duration::minutes(minutes);
        let req = TradeRequest::buy(symbol, 1, 10.0);
        LedgerCommit {
            holdings: vec![Holding::open(symbol, "", 1, 10.0, ts)],
            balance,
            transaction: Transaction::record(&req, ts),
        }
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = InMemoryLedger::new(25_000.0);
        assert!((ledger.read_balance().unwrap() - 25_000.0).abs() < f64::EPSILON);
        assert!(ledger.read_holdings().unwrap().is_empty());
        assert!(ledger.read_transactions(50, 0).unwrap().is_empty());
    }

    #[test]
    fn commit_applies_all_three_writes() {
        let mut ledger = InMemoryLedger::new(100.0);
        ledger.commit(&commit_for("AAPL", 0, 90.0)).unwrap();

        assert!((ledger.read_balance().unwrap() - 90.0).abs() < f64::EPSILON);
        assert_eq!(ledger.read_holding("AAPL").unwrap().unwrap().shares, 1);
        assert_eq!(ledger.read_transactions(50, 0).unwrap().len(), 1);
    }

    #[test]
    fn injected_failure_applies_nothing_and_clears() {
        let mut ledger = InMemoryLedger::new(100.0);
        ledger.fail_next_commit("boom");

        assert!(ledger.commit(&commit_for("AAPL", 0, 90.0)).is_err());
        assert!((ledger.read_balance().unwrap() - 100.0).abs() < f64::EPSILON);
        assert!(ledger.read_transactions(50, 0).unwrap().is_empty());

        assert!(ledger.commit(&commit_for("AAPL", 0, 90.0)).is_ok());
    }

    #[test]
    fn transactions_are_paged_newest_first() {
        let mut ledger = InMemoryLedger::new(100.0);
        for (i, symbol) in ["AAPL", "MSFT", "TSLA"].iter().enumerate() {
            ledger.commit(&commit_for(symbol, i as i64, 100.0)).unwrap();
        }

        let page: Vec<String> = ledger
            .read_transactions(2, 0)
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(page, vec!["TSLA", "MSFT"]);

        let rest = ledger.read_transactions(2, 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].symbol, "AAPL");
    }

    #[test]
    fn reset_clears_everything() {
        let mut ledger = InMemoryLedger::new(100.0);
        ledger.commit(&commit_for("AAPL", 0, 90.0)).unwrap();
        ledger.reset(500.0).unwrap();

        assert!((ledger.read_balance().unwrap() - 500.0).abs() < f64::EPSILON);
        assert!(ledger.read_holdings().unwrap().is_empty());
        assert!(ledger.read_transactions(50, 0).unwrap().is_empty());
    }
}

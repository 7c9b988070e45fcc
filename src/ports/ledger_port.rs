//! Persistence port for balance, holdings and the transaction log.

use crate::domain::error::PaperTradeError;
use crate::domain::holding::Holding;
use crate::domain::transaction::Transaction;

/// Everything one executed trade writes.
///
/// Implementations apply all three writes or none of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerCommit {
    /// Replacement holdings set (write_holdings).
    pub holdings: Vec<Holding>,
    /// New cash balance (write_balance).
    pub balance: f64,
    /// Record to append to the log (append_transaction).
    pub transaction: Transaction,
}

pub trait LedgerPort {
    fn read_holdings(&self) -> Result<Vec<Holding>, PaperTradeError>;

    fn read_balance(&self) -> Result<f64, PaperTradeError>;

    /// Most recent first.
    fn read_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>, PaperTradeError>;

    fn commit(&mut self, commit: &LedgerCommit) -> Result<(), PaperTradeError>;

    /// Drop all holdings and transactions and set the balance.
    fn reset(&mut self, starting_balance: f64) -> Result<(), PaperTradeError>;

    fn read_holding(&self, symbol: &str) -> Result<Option<Holding>, PaperTradeError> {
        Ok(self
            .read_holdings()?
            .into_iter()
            .find(|h| h.symbol == symbol))
    }
}

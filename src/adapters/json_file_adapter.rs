//! JSON file ledger.
//!
//! One document holding the same three keys the browser build kept in local
//! storage: the user record (which carries the balance), the portfolio and
//! the transaction list. Older documents wrote camelCase fields and
//! fractional share counts; both shapes are accepted on read and converted
//! to the canonical snake_case form here, so the domain only ever sees one
//! schema. Writes go to a sibling temp file that is renamed over the target,
//! so a commit is either fully on disk or not at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::PaperTradeError;
use crate::domain::holding::Holding;
use crate::domain::transaction::{TradeType, Transaction};
use crate::domain::validation::MAX_SHARES;
use crate::ports::ledger_port::{LedgerCommit, LedgerPort};

pub const DEFAULT_STARTING_BALANCE: f64 = 25_000.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(rename = "trading_app_user", default)]
    user: Option<StoredUser>,
    #[serde(rename = "trading_app_portfolio", default)]
    portfolio: Option<StoredPortfolio>,
    #[serde(rename = "trading_app_transactions", default)]
    transactions: Vec<StoredTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    #[serde(alias = "userId", default)]
    user_id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    balance: f64,
}

impl StoredUser {
    fn local(balance: f64) -> Self {
        StoredUser {
            user_id: "local-user".into(),
            username: "trader".into(),
            email: String::new(),
            balance,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPortfolio {
    #[serde(default)]
    holdings: Vec<StoredHolding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredHolding {
    symbol: String,
    #[serde(alias = "companyName", default)]
    company_name: String,
    shares: f64,
    #[serde(alias = "averageCost")]
    average_cost: f64,
    #[serde(alias = "currentPrice", default)]
    current_price: Option<f64>,
    #[serde(alias = "purchasedAt")]
    purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTransaction {
    #[serde(alias = "transactionId")]
    id: String,
    #[serde(rename = "type")]
    trade_type: TradeType,
    symbol: String,
    shares: f64,
    price: f64,
    #[serde(alias = "totalCost")]
    total_cost: f64,
    timestamp: DateTime<Utc>,
}

fn whole_shares(shares: f64, symbol: &str) -> Result<u64, PaperTradeError> {
    if !shares.is_finite() || shares < 0.0 || shares.fract() != 0.0 || shares > MAX_SHARES as f64
    {
        return Err(PaperTradeError::persistence(format!(
            "stored share count for {symbol} is not a whole number: {shares}"
        )));
    }
    Ok(shares as u64)
}

impl StoredHolding {
    /// `None` for a zero-share record, which is never a live holding.
    fn into_holding(self) -> Result<Option<Holding>, PaperTradeError> {
        let shares = whole_shares(self.shares, &self.symbol)?;
        if shares == 0 {
            return Ok(None);
        }
        let price = self.current_price.unwrap_or(self.average_cost);
        let holding = Holding {
            symbol: self.symbol,
            company_name: self.company_name,
            shares,
            average_cost: self.average_cost,
            current_price: price,
            current_value: 0.0,
            unrealized_pl: 0.0,
            unrealized_pl_percent: 0.0,
            purchased_at: self.purchased_at,
        };
        Ok(Some(holding.revalue(price)))
    }

    fn from_holding(h: &Holding) -> Self {
        StoredHolding {
            symbol: h.symbol.clone(),
            company_name: h.company_name.clone(),
            shares: h.shares as f64,
            average_cost: h.average_cost,
            current_price: Some(h.current_price),
            purchased_at: h.purchased_at,
        }
    }
}

impl StoredTransaction {
    fn into_transaction(self) -> Result<Transaction, PaperTradeError> {
        Ok(Transaction {
            shares: whole_shares(self.shares, &self.symbol)?,
            id: self.id,
            trade_type: self.trade_type,
            symbol: self.symbol,
            price: self.price,
            total_cost: self.total_cost,
            timestamp: self.timestamp,
        })
    }

    fn from_transaction(t: &Transaction) -> Self {
        StoredTransaction {
            id: t.id.clone(),
            trade_type: t.trade_type,
            symbol: t.symbol.clone(),
            shares: t.shares as f64,
            price: t.price,
            total_cost: t.total_cost,
            timestamp: t.timestamp,
        }
    }
}

pub struct JsonFileLedger {
    path: PathBuf,
    default_balance: f64,
}

impl JsonFileLedger {
    pub fn new<P: AsRef<Path>>(path: P, default_balance: f64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_balance,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, PaperTradeError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "ledger file missing, starting empty");
            return Ok(StoreDocument::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PaperTradeError::persistence(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PaperTradeError::persistence(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn store(&self, doc: &StoreDocument) -> Result<(), PaperTradeError> {
        let json = serde_json::to_string_pretty(doc).map_err(PaperTradeError::persistence)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| {
            PaperTradeError::persistence(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PaperTradeError::persistence(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl LedgerPort for JsonFileLedger {
    fn read_holdings(&self) -> Result<Vec<Holding>, PaperTradeError> {
        let doc = self.load()?;
        let mut holdings = Vec::new();
        for stored in doc.portfolio.unwrap_or_default().holdings {
            if let Some(h) = stored.into_holding()? {
                holdings.push(h);
            }
        }
        Ok(holdings)
    }

    fn read_balance(&self) -> Result<f64, PaperTradeError> {
        Ok(self
            .load()?
            .user
            .map_or(self.default_balance, |u| u.balance))
    }

    fn read_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>, PaperTradeError> {
        let mut transactions = self
            .load()?
            .transactions
            .into_iter()
            .map(StoredTransaction::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        // stable sort over reversed document order keeps later writes first on ties
        transactions.reverse();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions.into_iter().skip(offset).take(limit).collect())
    }

    fn commit(&mut self, commit: &LedgerCommit) -> Result<(), PaperTradeError> {
        let mut doc = self.load()?;

        let mut user = doc
            .user
            .take()
            .unwrap_or_else(|| StoredUser::local(self.default_balance));
        user.balance = commit.balance;
        doc.user = Some(user);

        doc.portfolio = Some(StoredPortfolio {
            holdings: commit
                .holdings
                .iter()
                .map(StoredHolding::from_holding)
                .collect(),
        });

        doc.transactions
            .push(StoredTransaction::from_transaction(&commit.transaction));

        self.store(&doc)
    }

    fn reset(&mut self, starting_balance: f64) -> Result<(), PaperTradeError> {
        let doc = StoreDocument {
            user: Some(StoredUser::local(starting_balance)),
            portfolio: Some(StoredPortfolio::default()),
            transactions: Vec::new(),
        };
        self.store(&doc)
    }
}

//! SQLite ledger.

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::domain::error::PaperTradeError;
use crate::domain::holding::Holding;
use crate::domain::transaction::{TradeType, Transaction};
use crate::ports::ledger_port::{LedgerCommit, LedgerPort};

pub struct SqliteLedger {
    pool: Pool<SqliteConnectionManager>,
    default_balance: f64,
}

fn query_err(e: rusqlite::Error) -> PaperTradeError {
    PaperTradeError::persistence(e)
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn to_sql_shares(shares: u64) -> Result<i64, PaperTradeError> {
    i64::try_from(shares)
        .map_err(|_| PaperTradeError::persistence(format!("share count {shares} out of range")))
}

impl SqliteLedger {
    pub fn open(path: &Path, default_balance: f64, pool_size: u32) -> Result<Self, PaperTradeError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| PaperTradeError::persistence(e))?;

        let ledger = Self {
            pool,
            default_balance,
        };
        ledger.initialize_schema()?;
        tracing::debug!(path = %path.display(), "opened sqlite ledger");
        Ok(ledger)
    }

    pub fn in_memory(default_balance: f64) -> Result<Self, PaperTradeError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| PaperTradeError::persistence(e))?;

        let ledger = Self {
            pool,
            default_balance,
        };
        ledger.initialize_schema()?;
        Ok(ledger)
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, PaperTradeError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| PaperTradeError::persistence(e))
    }

    pub fn initialize_schema(&self) -> Result<(), PaperTradeError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                balance REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS holdings (
                symbol TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                shares INTEGER NOT NULL CHECK (shares > 0),
                average_cost REAL NOT NULL,
                current_price REAL NOT NULL,
                purchased_at TEXT NOT NULL,
                position INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS transactions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                type TEXT NOT NULL CHECK (type IN ('BUY', 'SELL')),
                symbol TEXT NOT NULL,
                shares INTEGER NOT NULL,
                price REAL NOT NULL,
                total_cost REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);",
        )
        .map_err(query_err)?;
        Ok(())
    }
}

impl LedgerPort for SqliteLedger {
    fn read_holdings(&self) -> Result<Vec<Holding>, PaperTradeError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, company_name, shares, average_cost, current_price, purchased_at
                 FROM holdings ORDER BY position ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let shares: i64 = row.get(2)?;
                let current_price: f64 = row.get(4)?;
                let holding = Holding {
                    symbol: row.get(0)?,
                    company_name: row.get(1)?,
                    shares: shares as u64,
                    average_cost: row.get(3)?,
                    current_price,
                    current_value: 0.0,
                    unrealized_pl: 0.0,
                    unrealized_pl_percent: 0.0,
                    purchased_at: parse_timestamp(5, row.get(5)?)?,
                };
                Ok(holding.revalue(current_price))
            })
            .map_err(query_err)?;

        let mut holdings = Vec::new();
        for row in rows {
            holdings.push(row.map_err(query_err)?);
        }
        tracing::debug!(count = holdings.len(), "read holdings");
        Ok(holdings)
    }

    fn read_balance(&self) -> Result<f64, PaperTradeError> {
        let conn = self.conn()?;
        let balance: Option<f64> = conn
            .query_row("SELECT balance FROM account WHERE id = 1", [], |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
            .map_err(query_err)?;
        Ok(balance.unwrap_or(self.default_balance))
    }

    fn read_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>, PaperTradeError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, type, symbol, shares, price, total_cost, timestamp
                 FROM transactions
                 ORDER BY timestamp DESC, seq DESC
                 LIMIT ?1 OFFSET ?2",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                let type_str: String = row.get(1)?;
                let trade_type = type_str.parse::<TradeType>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;
                let shares: i64 = row.get(3)?;
                Ok(Transaction {
                    id: row.get(0)?,
                    trade_type,
                    symbol: row.get(2)?,
                    shares: shares as u64,
                    price: row.get(4)?,
                    total_cost: row.get(5)?,
                    timestamp: parse_timestamp(6, row.get(6)?)?,
                })
            })
            .map_err(query_err)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row.map_err(query_err)?);
        }
        Ok(transactions)
    }

    fn commit(&mut self, commit: &LedgerCommit) -> Result<(), PaperTradeError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute(
            "INSERT INTO transactions (id, type, symbol, shares, price, total_cost, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                commit.transaction.id,
                commit.transaction.trade_type.as_str(),
                commit.transaction.symbol,
                to_sql_shares(commit.transaction.shares)?,
                commit.transaction.price,
                commit.transaction.total_cost,
                commit.transaction.timestamp.to_rfc3339(),
            ],
        )
        .map_err(query_err)?;

        tx.execute(
            "INSERT INTO account (id, balance) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET balance = excluded.balance",
            params![commit.balance],
        )
        .map_err(query_err)?;

        tx.execute("DELETE FROM holdings", []).map_err(query_err)?;
        for (position, h) in commit.holdings.iter().enumerate() {
            tx.execute(
                "INSERT INTO holdings
                 (symbol, company_name, shares, average_cost, current_price, purchased_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    h.symbol,
                    h.company_name,
                    to_sql_shares(h.shares)?,
                    h.average_cost,
                    h.current_price,
                    h.purchased_at.to_rfc3339(),
                    position as i64,
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(())
    }

    fn reset(&mut self, starting_balance: f64) -> Result<(), PaperTradeError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        tx.execute_batch("DELETE FROM holdings; DELETE FROM transactions; DELETE FROM account;")
            .map_err(query_err)?;
        tx.execute(
            "INSERT INTO account (id, balance) VALUES (1, ?1)",
            params![starting_balance],
        )
        .map_err(query_err)?;
        tx.commit().map_err(query_err)?;
        Ok(())
    }
}

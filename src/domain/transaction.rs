//! Trade requests and the immutable transaction log entries they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            other => Err(format!("invalid transaction type: {other}")),
        }
    }
}

/// An order as submitted by the user, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub trade_type: TradeType,
    pub symbol: String,
    pub company_name: String,
    pub shares: u64,
    pub price: f64,
}

impl TradeRequest {
    pub fn new(trade_type: TradeType, symbol: &str, shares: u64, price: f64) -> Self {
        TradeRequest {
            trade_type,
            symbol: symbol.trim().to_uppercase(),
            company_name: String::new(),
            shares,
            price,
        }
    }

    pub fn buy(symbol: &str, shares: u64, price: f64) -> Self {
        Self::new(TradeType::Buy, symbol, shares, price)
    }

    pub fn sell(symbol: &str, shares: u64, price: f64) -> Self {
        Self::new(TradeType::Sell, symbol, shares, price)
    }

    pub fn with_company_name(mut self, name: &str) -> Self {
        self.company_name = name.to_string();
        self
    }

    pub fn total_cost(&self) -> f64 {
        self.shares as f64 * self.price
    }
}

/// One executed trade. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type", alias = "trade_type")]
    pub trade_type: TradeType,
    pub symbol: String,
    pub shares: u64,
    pub price: f64,
    pub total_cost: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn record(request: &TradeRequest, timestamp: DateTime<Utc>) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            trade_type: request.trade_type,
            symbol: request.symbol.clone(),
            shares: request.shares,
            price: request.price,
            total_cost: request.total_cost(),
            timestamp,
        }
    }
}

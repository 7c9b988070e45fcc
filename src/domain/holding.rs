//! Holdings: a user's current position in one symbol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub company_name: String,
    pub shares: u64,
    pub average_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub unrealized_pl: f64,
    pub unrealized_pl_percent: f64,
    pub purchased_at: DateTime<Utc>,
}

impl Holding {
    /// A freshly opened holding, valued at its purchase price.
    pub fn open(
        symbol: &str,
        company_name: &str,
        shares: u64,
        price: f64,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        Holding {
            symbol: symbol.to_string(),
            company_name: company_name.to_string(),
            shares,
            average_cost: price,
            current_price: price,
            current_value: 0.0,
            unrealized_pl: 0.0,
            unrealized_pl_percent: 0.0,
            purchased_at,
        }
        .revalue(price)
    }

    /// Cost basis of the shares currently held.
    pub fn invested(&self) -> f64 {
        self.shares as f64 * self.average_cost
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    /// Copy of this holding with every derived field recomputed at `price`.
    ///
    /// The percentage is 0 when nothing is invested.
    pub fn revalue(&self, price: f64) -> Holding {
        let current_value = self.market_value(price);
        let invested = self.invested();
        let unrealized_pl = current_value - invested;
        let unrealized_pl_percent = if invested > 0.0 {
            unrealized_pl / invested * 100.0
        } else {
            0.0
        };

        Holding {
            current_price: price,
            current_value,
            unrealized_pl,
            unrealized_pl_percent,
            ..self.clone()
        }
    }

    /// Add `shares` bought for `total_cost`, reweighting the average cost.
    pub fn with_purchase(&self, shares: u64, total_cost: f64) -> Holding {
        let new_shares = self.shares.saturating_add(shares);
        let average_cost = (self.average_cost * self.shares as f64 + total_cost) / new_shares as f64;
        Holding {
            shares: new_shares,
            average_cost,
            ..self.clone()
        }
    }

    /// Remove `shares`. Returns `None` when nothing would remain, which
    /// includes selling more than is held; callers validate first.
    ///
    /// Average cost is left as is.
    pub fn with_sale(&self, shares: u64) -> Option<Holding> {
        let remaining = self.shares.checked_sub(shares).filter(|&s| s > 0)?;
        Some(Holding {
            shares: remaining,
            ..self.clone()
        })
    }
}

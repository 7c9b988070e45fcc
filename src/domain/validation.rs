//! Pre-trade checks.
//!
//! Nothing here touches storage: callers read the balance and holding, then
//! ask whether the request may go ahead.

use super::error::TradeRejection;
use super::holding::Holding;
use super::transaction::{TradeRequest, TradeType};

pub const MAX_SYMBOL_LEN: usize = 10;

/// Largest share count a holding or trade may carry: 2^53, the last integer
/// an `f64` represents exactly. It also fits in an SQLite `INTEGER`.
pub const MAX_SHARES: u64 = 1 << 53;

pub fn validate_trade(
    request: &TradeRequest,
    balance: f64,
    holding: Option<&Holding>,
) -> Result<(), TradeRejection> {
    validate_shares(request)?;
    validate_price(request)?;
    validate_symbol(&request.symbol)?;

    match request.trade_type {
        TradeType::Buy => validate_buy(request, balance, holding),
        TradeType::Sell => validate_sell(request, holding),
    }
}

fn validate_shares(request: &TradeRequest) -> Result<(), TradeRejection> {
    if request.shares == 0 || request.shares > MAX_SHARES {
        return Err(TradeRejection::InvalidShareCount {
            shares: request.shares,
        });
    }
    Ok(())
}

fn validate_price(request: &TradeRequest) -> Result<(), TradeRejection> {
    if !request.price.is_finite() || request.price <= 0.0 {
        return Err(TradeRejection::InvalidPrice {
            price: request.price,
        });
    }
    Ok(())
}

pub fn validate_symbol(symbol: &str) -> Result<(), TradeRejection> {
    let well_formed = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_uppercase());
    if !well_formed {
        return Err(TradeRejection::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

fn validate_buy(
    request: &TradeRequest,
    balance: f64,
    holding: Option<&Holding>,
) -> Result<(), TradeRejection> {
    let held = holding
        .filter(|h| h.symbol == request.symbol)
        .map_or(0, |h| h.shares);
    match held.checked_add(request.shares) {
        Some(total) if total <= MAX_SHARES => {}
        _ => {
            return Err(TradeRejection::InvalidShareCount {
                shares: request.shares,
            })
        }
    }

    let required = request.total_cost();
    if required > balance {
        return Err(TradeRejection::InsufficientBalance {
            available: balance,
            required,
        });
    }
    Ok(())
}

fn validate_sell(request: &TradeRequest, holding: Option<&Holding>) -> Result<(), TradeRejection> {
    let available = holding
        .filter(|h| h.symbol == request.symbol)
        .map_or(0, |h| h.shares);
    if request.shares > available {
        return Err(TradeRejection::InsufficientShares {
            symbol: request.symbol.clone(),
            available,
            requested: request.shares,
        });
    }
    Ok(())
}

/// Turn raw share input into a share count the way the trade form does:
/// anything unparseable or below 1 becomes 1, fractions are truncated.
pub fn clamp_share_input(raw: &str) -> u64 {
    let trimmed = raw.trim();
    let integer_part = trimmed
        .split_once('.')
        .map_or(trimmed, |(whole, _)| whole);
    match integer_part.parse::<i64>() {
        Ok(n) if n >= 1 => n as u64,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn holding(shares: u64) -> Holding {
        let ts = Utc.with_ymd_and_hms(2024, 10, 16, 15, 30, 0).unwrap();
        Holding::open("AAPL", "Apple Inc.", shares, 175.0, ts)
    }

    #[test]
    fn buy_within_balance_accepted() {
        let req = TradeRequest::buy("AAPL", 10, 175.0);
        assert!(validate_trade(&req, 25_000.0, None).is_ok());
    }

    #[test]
    fn buy_spending_exact_balance_accepted() {
        let req = TradeRequest::buy("AAPL", 10, 175.0);
        assert!(validate_trade(&req, 1750.0, None).is_ok());
    }

    #[test]
    fn buy_over_balance_rejected() {
        let req = TradeRequest::buy("AAPL", 10, 175.0);
        let err = validate_trade(&req, 1749.99, None).unwrap_err();
        assert_eq!(
            err,
            TradeRejection::InsufficientBalance {
                available: 1749.99,
                required: 1750.0
            }
        );
    }

    #[test]
    fn zero_shares_rejected() {
        let req = TradeRequest::buy("AAPL", 0, 175.0);
        assert_eq!(
            validate_trade(&req, 25_000.0, None).unwrap_err(),
            TradeRejection::InvalidShareCount { shares: 0 }
        );
    }

    #[test]
    fn share_count_above_cap_rejected() {
        let req = TradeRequest::buy("AAPL", MAX_SHARES + 1, 1e-12);
        assert_eq!(
            validate_trade(&req, 25_000.0, None).unwrap_err(),
            TradeRejection::InvalidShareCount {
                shares: MAX_SHARES + 1
            }
        );
    }

    #[test]
    fn buy_that_would_overflow_holding_rejected() {
        let held = holding(MAX_SHARES - 5);
        let req = TradeRequest::buy("AAPL", 6, 1e-12);
        assert_eq!(
            validate_trade(&req, 25_000.0, Some(&held)).unwrap_err(),
            TradeRejection::InvalidShareCount { shares: 6 }
        );

        let req = TradeRequest::buy("AAPL", 5, 1e-12);
        assert!(validate_trade(&req, 25_000.0, Some(&held)).is_ok());
    }

    #[test]
    fn non_positive_price_rejected() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let req = TradeRequest::buy("AAPL", 1, price);
            assert!(matches!(
                validate_trade(&req, 25_000.0, None),
                Err(TradeRejection::InvalidPrice { .. })
            ));
        }
    }

    #[test]
    fn malformed_symbol_rejected() {
        for symbol in ["", "BRK.B", "TOOLONGSYMBOL", "A1"] {
            let req = TradeRequest::buy(symbol, 1, 10.0);
            assert!(
                matches!(
                    validate_trade(&req, 25_000.0, None),
                    Err(TradeRejection::InvalidSymbol { .. })
                ),
                "{symbol} should be rejected"
            );
        }
    }

    #[test]
    fn sell_within_holding_accepted() {
        let h = holding(10);
        assert!(validate_trade(&TradeRequest::sell("AAPL", 10, 1.0), 0.0, Some(&h)).is_ok());
        assert!(validate_trade(&TradeRequest::sell("AAPL", 3, 1.0), 0.0, Some(&h)).is_ok());
    }

    #[test]
    fn sell_more_than_held_rejected() {
        let h = holding(10);
        let err = validate_trade(&TradeRequest::sell("AAPL", 11, 190.0), 1e9, Some(&h)).unwrap_err();
        assert_eq!(
            err,
            TradeRejection::InsufficientShares {
                symbol: "AAPL".into(),
                available: 10,
                requested: 11
            }
        );
    }

    #[test]
    fn sell_without_holding_rejected() {
        let err = validate_trade(&TradeRequest::sell("AAPL", 1, 190.0), 1e9, None).unwrap_err();
        assert!(matches!(
            err,
            TradeRejection::InsufficientShares { available: 0, .. }
        ));
    }

    #[test]
    fn sell_against_other_symbol_holding_rejected() {
        let h = holding(10);
        let err = validate_trade(&TradeRequest::sell("MSFT", 1, 380.0), 0.0, Some(&h)).unwrap_err();
        assert!(matches!(err, TradeRejection::InsufficientShares { .. }));
    }

    #[test]
    fn clamp_share_input_rules() {
        assert_eq!(clamp_share_input("5"), 5);
        assert_eq!(clamp_share_input(" 12 "), 12);
        assert_eq!(clamp_share_input("7.9"), 7);
        assert_eq!(clamp_share_input("0"), 1);
        assert_eq!(clamp_share_input("-3"), 1);
        assert_eq!(clamp_share_input(""), 1);
        assert_eq!(clamp_share_input("abc"), 1);
    }
}

//! # engine::executor
//!
//! **Liquidation Decision & Executor**: per position: skip, hold, or sell
//! the whole quantity at market for the day.
//!
//! The decision is a pure function so it can be tested without a broker.
//! Submission failures are logged and reported back; they never stop the
//! evaluation of the remaining positions, and nothing is retried within the
//! cycle.

use tracing::{error, info};

use crate::broker::TradingApi;
use crate::engine::evaluator::gain_fraction;
use crate::models::{parse_decimal, OrderRequest, Position};

// ─── Decision ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Short or unrecognised side; this bot only exits longs.
    NotLong,
    UnknownGain,
    Hold { gain: f64 },
    Sell { gain: f64, qty: String },
}

/// Quantity usable for a full-size sell: present, non-blank and strictly
/// positive.  Returned trimmed but otherwise as the broker wrote it.
pub fn sellable_qty(qty: Option<&str>) -> Option<&str> {
    let qty = qty.map(str::trim).filter(|q| !q.is_empty())?;
    parse_decimal(Some(qty)).filter(|v| *v > 0.0).map(|_| qty)
}

pub fn decide(position: &Position, take_profit_pct: f64) -> Decision {
    if !position.side.is_long() {
        return Decision::NotLong;
    }

    let Some(gain) = gain_fraction(position) else {
        return Decision::UnknownGain;
    };

    match sellable_qty(position.qty.as_deref()) {
        Some(qty) if gain >= take_profit_pct => Decision::Sell { gain, qty: qty.to_string() },
        _ => Decision::Hold { gain },
    }
}

// ─── Execution ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PositionAction {
    Skipped,
    Held,
    Sold { order_id: String },
    SellFailed { error: String },
}

/// Decides and, on a sell decision, submits the order.
pub async fn process_position(
    trading: &dyn TradingApi,
    position: &Position,
    take_profit_pct: f64,
) -> PositionAction {
    let symbol = position.symbol.as_str();

    match decide(position, take_profit_pct) {
        Decision::NotLong => {
            info!(symbol, side = %position.side, "Not a long position; skipping");
            PositionAction::Skipped
        }
        Decision::UnknownGain => {
            info!(symbol, "Unable to compute P/L pct; skipping");
            PositionAction::Skipped
        }
        Decision::Hold { gain } => {
            log_gain(position, gain, take_profit_pct);
            info!(symbol, "HOLD {symbol}");
            PositionAction::Held
        }
        Decision::Sell { gain, qty } => {
            log_gain(position, gain, take_profit_pct);
            sell_all(trading, symbol, &qty).await
        }
    }
}

fn log_gain(position: &Position, gain: f64, take_profit_pct: f64) {
    info!(
        symbol  = %position.symbol,
        gain    = %format!("{:.2}%", gain * 100.0),
        target  = %format!("{:.2}%", take_profit_pct * 100.0),
        avg     = ?position.avg_entry_price,
        current = ?position.current_price,
        qty     = position.qty.as_deref().unwrap_or("?"),
        "Position evaluated"
    );
}

async fn sell_all(trading: &dyn TradingApi, symbol: &str, qty: &str) -> PositionAction {
    let order = OrderRequest::market_sell_day(symbol, qty);

    match trading.submit_order(&order).await {
        Ok(ack) => {
            info!(
                symbol,
                qty,
                order_id        = %ack.id,
                client_order_id = %order.client_order_id,
                status          = ack.status.as_deref().unwrap_or("unknown"),
                "💰 SELL ALL submitted"
            );
            PositionAction::Sold { order_id: ack.id }
        }
        Err(e) => {
            error!(symbol, qty, error = %e, "❌ Failed to submit SELL; will re-evaluate next cycle");
            PositionAction::SellFailed { error: e.to_string() }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::fake::{long_position, FakeTrading};
    use crate::models::order::{OrderSide, OrderType, TimeInForce};
    use crate::models::position::PositionRecord;
    use crate::models::PositionSide;

    #[test]
    fn non_long_never_sells() {
        for side in [PositionSide::Short, PositionSide::Other("unknown".into())] {
            let mut pos = long_position("GOOG", "5", 0.50);
            pos.side = side;
            assert_eq!(decide(&pos, 0.05), Decision::NotLong);
        }
    }

    #[test]
    fn unknown_gain_never_sells() {
        let pos = Position {
            symbol:          "XYZ".to_string(),
            side:            PositionSide::Long,
            qty:             Some("5".to_string()),
            avg_entry_price: None,
            current_price:   Some(120.0),
            unrealized_plpc: None,
        };
        assert_eq!(decide(&pos, 0.05), Decision::UnknownGain);
    }

    #[test]
    fn nan_broker_gain_holds_instead_of_using_prices() {
        let raw = r#"{ "symbol": "AAPL", "side": "long", "qty": "10", "avg_entry_price": "100",
                       "current_price": "110", "unrealized_plpc": "NaN" }"#;
        let pos = Position::from(serde_json::from_str::<PositionRecord>(raw).unwrap());

        assert_eq!(decide(&pos, 0.05), Decision::UnknownGain);
    }

    #[test]
    fn threshold_is_inclusive() {
        let at = long_position("AAPL", "10", 0.05);
        assert_eq!(decide(&at, 0.05), Decision::Sell { gain: 0.05, qty: "10".into() });

        let below = long_position("AAPL", "10", 0.0499);
        assert_eq!(decide(&below, 0.05), Decision::Hold { gain: 0.0499 });
    }

    #[test]
    fn fallback_gain_at_threshold_sells() {
        let pos = Position {
            symbol:          "AAPL".to_string(),
            side:            PositionSide::Long,
            qty:             Some("10".to_string()),
            avg_entry_price: Some(100.0),
            current_price:   Some(105.0),
            unrealized_plpc: None,
        };
        assert!(matches!(decide(&pos, 0.05), Decision::Sell { .. }));
    }

    #[test]
    fn missing_or_zero_quantity_holds() {
        for qty in [None, Some(""), Some("  "), Some("0"), Some("0.000"), Some("abc")] {
            let mut pos = long_position("AAPL", "1", 0.20);
            pos.qty = qty.map(str::to_string);
            assert_eq!(decide(&pos, 0.05), Decision::Hold { gain: 0.20 }, "qty {qty:?}");
        }
    }

    #[test]
    fn fractional_quantity_passes_through() {
        assert_eq!(sellable_qty(Some(" 0.2573 ")), Some("0.2573"));
    }

    #[tokio::test]
    async fn sell_submits_full_quantity_day_market_order() {
        let broker = FakeTrading::default();
        let action = process_position(&broker, &long_position("AAPL", "12.5", 0.07), 0.05).await;

        assert_eq!(action, PositionAction::Sold { order_id: "order-1".into() });
        let orders = broker.submitted();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol, "AAPL");
        assert_eq!(orders[0].qty, "12.5");
        assert_eq!(orders[0].side, OrderSide::Sell);
        assert_eq!(orders[0].order_type, OrderType::Market);
        assert_eq!(orders[0].time_in_force, TimeInForce::Day);
    }

    #[tokio::test]
    async fn rejected_sell_is_reported_not_raised() {
        let broker = FakeTrading { reject_symbols: vec!["AAPL".into()], ..Default::default() };
        let action = process_position(&broker, &long_position("AAPL", "10", 0.07), 0.05).await;

        assert!(matches!(action, PositionAction::SellFailed { .. }));
        assert!(broker.submitted().is_empty());
    }
}

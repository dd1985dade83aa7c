//! # models::order
//!
//! The one order this bot ever sends: a full-quantity market sell, valid for
//! the day.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Cancelled by the broker if still unfilled at the session close.
    Day,
}

/// Body of `POST /v2/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    /// Decimal string, passed through from the position.
    pub qty: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    /// `tp-<uuid>` so fills can be traced back to this bot.
    pub client_order_id: String,
}

impl OrderRequest {
    pub fn market_sell_day(symbol: &str, qty: &str) -> Self {
        Self {
            symbol:          symbol.to_string(),
            qty:             qty.to_string(),
            side:            OrderSide::Sell,
            order_type:      OrderType::Market,
            time_in_force:   TimeInForce::Day,
            client_order_id: format!("tp-{}", Uuid::new_v4()),
        }
    }
}

/// What we keep from the broker's order response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderAck {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

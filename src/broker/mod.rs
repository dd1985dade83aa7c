//! Broker seams.
//!
//! The engine only ever talks to these two traits.  [`alpaca::AlpacaClient`]
//! implements both against the REST API; tests swap in the in-memory fakes.

use async_trait::async_trait;

use crate::error::BrokerResult;
use crate::models::{BarsRequest, MarketClock, OrderAck, OrderRequest, Position, PriceBar};

pub mod alpaca;
#[cfg(test)]
pub mod fake;

/// Account-side operations.
#[async_trait]
pub trait TradingApi: Send + Sync {
    async fn market_clock(&self) -> BrokerResult<MarketClock>;

    async fn open_positions(&self) -> BrokerResult<Vec<Position>>;

    /// Returns the broker's acknowledgement carrying the order id.
    async fn submit_order(&self, order: &OrderRequest) -> BrokerResult<OrderAck>;
}

/// Historical market data.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Bars in whatever order the source returns them; callers sort.
    async fn price_bars(&self, request: &BarsRequest) -> BrokerResult<Vec<PriceBar>>;
}

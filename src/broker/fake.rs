//! In-memory broker used by the engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::America::New_York;

use crate::broker::{MarketDataApi, TradingApi};
use crate::error::{BrokerError, BrokerResult};
use crate::models::{
    BarsRequest, MarketClock, OrderAck, OrderRequest, Position, PositionSide, PriceBar,
};

/// Trading side.  `None` for `clock`/`positions` makes that call fail.
#[derive(Default)]
pub struct FakeTrading {
    pub clock:          Option<MarketClock>,
    pub positions:      Option<Vec<Position>>,
    /// Orders for these symbols are refused.
    pub reject_symbols: Vec<String>,
    pub submitted:      Mutex<Vec<OrderRequest>>,
    pub clock_calls:    Mutex<u32>,
}

impl FakeTrading {
    pub fn open_with(positions: Vec<Position>) -> Self {
        Self {
            clock: Some(clock(true)),
            positions: Some(positions),
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradingApi for FakeTrading {
    async fn market_clock(&self) -> BrokerResult<MarketClock> {
        *self.clock_calls.lock().unwrap() += 1;
        self.clock.clone().ok_or_else(|| unavailable("clock"))
    }

    async fn open_positions(&self) -> BrokerResult<Vec<Position>> {
        self.positions.clone().ok_or_else(|| unavailable("positions"))
    }

    async fn submit_order(&self, order: &OrderRequest) -> BrokerResult<OrderAck> {
        if self.reject_symbols.contains(&order.symbol) {
            return Err(BrokerError::Rejected(format!("{} is not tradable", order.symbol)));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(order.clone());
        Ok(OrderAck {
            id:     format!("order-{}", submitted.len()),
            status: Some("accepted".to_string()),
        })
    }
}

/// Data side: bars keyed by feed.  A feed with no entry errors out.
#[derive(Default)]
pub struct FakeData {
    pub feeds:    HashMap<String, Vec<PriceBar>>,
    pub requests: Mutex<Vec<BarsRequest>>,
}

impl FakeData {
    pub fn with_feed(feed: &str, bars: Vec<PriceBar>) -> Self {
        let mut data = Self::default();
        data.feeds.insert(feed.to_string(), bars);
        data
    }

    pub fn requested_feeds(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.feed.clone()).collect()
    }
}

#[async_trait]
impl MarketDataApi for FakeData {
    async fn price_bars(&self, request: &BarsRequest) -> BrokerResult<Vec<PriceBar>> {
        self.requests.lock().unwrap().push(request.clone());
        self.feeds
            .get(&request.feed)
            .cloned()
            .ok_or_else(|| unavailable(&format!("feed {}", request.feed)))
    }
}

fn unavailable(what: &str) -> BrokerError {
    BrokerError::Http { status: 503, body: format!("{what} unavailable") }
}

// ─── Builders ─────────────────────────────────────────────────────────────────

/// Instant for an Eastern wall-clock time.
pub fn et(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    New_York.with_ymd_and_hms(y, m, d, h, min, s).single().unwrap().with_timezone(&Utc)
}

/// Thursday 2024-01-04, 11:00 ET: inside every window check.
pub fn thursday_midday() -> DateTime<Utc> {
    et(2024, 1, 4, 11, 0, 0)
}

pub fn clock(is_open: bool) -> MarketClock {
    MarketClock {
        is_open,
        next_open: et(2024, 1, 5, 9, 30, 0),
    }
}

/// Bars 15 minutes apart, oldest first, ending at the Thursday fixture.
pub fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let end = thursday_midday();
    let n = closes.len() as i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: end - Duration::minutes(15 * (n - i as i64)),
            close,
        })
        .collect()
}

/// Steadily rising closes: short SMA ends above the long SMA.
pub fn uptrend(n: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..n).map(|i| 400.0 + i as f64 * 0.1).collect();
    bars(&closes)
}

pub fn long_position(symbol: &str, qty: &str, plpc: f64) -> Position {
    Position {
        symbol:          symbol.to_string(),
        side:            PositionSide::Long,
        qty:             Some(qty.to_string()),
        avg_entry_price: Some(100.0),
        current_price:   Some(100.0 * (1.0 + plpc)),
        unrealized_plpc: Some(plpc),
    }
}

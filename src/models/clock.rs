//! # models::clock
//!
//! Snapshot of the broker's market clock (`GET /v2/clock`).

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketClock {
    pub is_open: bool,
    /// Alpaca reports this with an Eastern offset; it is normalised to UTC.
    pub next_open: DateTime<Utc>,
}

//! # models::bar
//!
//! 15-minute price bars for the reference index, used only by the trend gate.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Bar duration requested from the data API.
pub const BAR_TIMEFRAME: &str = "15Min";

/// One closed bar.  Only the close feeds the moving averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Parameters for a historical bars query.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsRequest {
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Maximum number of bars; the most recent ones are returned.
    pub limit: usize,
    /// Data feed identifier, e.g. `"iex"` or `"sip"`.
    pub feed: String,
}

/// Body of `GET /v2/stocks/{symbol}/bars`.
///
/// Alpaca sends `"bars": null` when the range holds no data.
#[derive(Debug, Deserialize)]
pub struct BarsPage {
    #[serde(default)]
    pub bars: Option<Vec<BarRecord>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Single bar on the wire (`t` = open time, `c` = close).
#[derive(Debug, Deserialize)]
pub struct BarRecord {
    pub t: DateTime<Utc>,
    pub c: f64,
}

impl From<BarRecord> for PriceBar {
    fn from(record: BarRecord) -> Self {
        Self { timestamp: record.t, close: record.c }
    }
}

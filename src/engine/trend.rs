//! # engine::trend
//!
//! **Trend Gate**: a regime filter on the reference index.
//!
//! Sells are allowed only while the 60-bar SMA of 15-minute closes sits
//! strictly above the 240-bar SMA.  Anything short of a clean answer (fetch
//! failure, too few bars, non-finite closes, equal averages) blocks.
//!
//! ## Fetch
//! ```text
//! configured feed ──ok, non-empty──▶ bars
//!        │
//!        └─ error / empty ──▶ feed != "iex" ? retry once on "iex" : give up
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::broker::MarketDataApi;
use crate::config::TrendConfig;
use crate::models::{BarsRequest, GateDecision, PriceBar};

/// Feed known to be available on every Alpaca account.
pub const FALLBACK_FEED: &str = "iex";

/// 15-minute bars in one 09:30–16:00 session.
const BARS_PER_SESSION: usize = 26;

#[derive(Debug, Clone, PartialEq)]
pub enum TrendBlock {
    NoData,
    InsufficientBars { got: usize, need: usize },
    /// A close was NaN or infinite.
    InvalidData,
    /// An average could not be formed over its full window.
    NotReady,
    NotUptrend { short_sma: f64, long_sma: f64 },
}

impl std::fmt::Display for TrendBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendBlock::NoData => write!(f, "no bars returned"),
            TrendBlock::InsufficientBars { got, need } => write!(f, "only {got} bars, need {need}"),
            TrendBlock::InvalidData => write!(f, "non-finite close in bar data"),
            TrendBlock::NotReady => write!(f, "moving averages not ready"),
            TrendBlock::NotUptrend { short_sma, long_sma } => {
                write!(f, "short SMA {short_sma:.4} is not above long SMA {long_sma:.4}")
            }
        }
    }
}

/// Arithmetic mean of the last `period` values.  `None` unless the full
/// window is available.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}

/// Start of the request range: enough calendar days to hold `bar_limit`
/// regular-session bars across weekends and holidays.  Saturates at the
/// earliest representable instant instead of overflowing.
pub fn lookback_start(now: DateTime<Utc>, bar_limit: usize) -> DateTime<Utc> {
    let sessions = bar_limit.div_ceil(BARS_PER_SESSION).max(1);
    let calendar_days = sessions.saturating_mul(7) / 5 + 7;

    i64::try_from(calendar_days)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Pure decision over fetched bars.
pub fn evaluate_trend(
    bars: &[PriceBar],
    short_window: usize,
    long_window: usize,
) -> GateDecision<TrendBlock> {
    if bars.is_empty() {
        return GateDecision::Block(TrendBlock::NoData);
    }
    if bars.len() < long_window {
        return GateDecision::Block(TrendBlock::InsufficientBars { got: bars.len(), need: long_window });
    }

    let mut ordered = bars.to_vec();
    ordered.sort_by_key(|b| b.timestamp);
    let closes: Vec<f64> = ordered.iter().map(|b| b.close).collect();

    if closes.iter().any(|c| !c.is_finite()) {
        return GateDecision::Block(TrendBlock::InvalidData);
    }

    match (sma(&closes, short_window), sma(&closes, long_window)) {
        (Some(short_sma), Some(long_sma)) if short_sma > long_sma => GateDecision::Allow,
        (Some(short_sma), Some(long_sma)) => GateDecision::Block(TrendBlock::NotUptrend { short_sma, long_sma }),
        _ => GateDecision::Block(TrendBlock::NotReady),
    }
}

/// Fetches index bars, falling back to [`FALLBACK_FEED`] once.
/// Errors are logged and come back as an empty list.
pub async fn fetch_index_bars(
    data: &dyn MarketDataApi,
    config: &TrendConfig,
    now: DateTime<Utc>,
) -> Vec<PriceBar> {
    let bars = fetch_from_feed(data, config, &config.feed, now).await;
    if !bars.is_empty() || config.feed == FALLBACK_FEED {
        return bars;
    }

    warn!(feed = %config.feed, fallback = FALLBACK_FEED, "No bars from configured feed; retrying on fallback");
    fetch_from_feed(data, config, FALLBACK_FEED, now).await
}

async fn fetch_from_feed(
    data: &dyn MarketDataApi,
    config: &TrendConfig,
    feed: &str,
    now: DateTime<Utc>,
) -> Vec<PriceBar> {
    let request = BarsRequest {
        symbol: config.symbol.clone(),
        start:  lookback_start(now, config.bar_limit),
        end:    now,
        limit:  config.bar_limit,
        feed:   feed.to_string(),
    };

    match data.price_bars(&request).await {
        Ok(bars) => {
            debug!(feed, count = bars.len(), "Index bars received");
            bars
        }
        Err(e) => {
            warn!(feed, symbol = %config.symbol, error = %e, "Index bar fetch failed");
            Vec::new()
        }
    }
}

/// Full gate: fetch, then decide.  Fail-closed.
pub async fn check_trend(
    data: &dyn MarketDataApi,
    config: &TrendConfig,
    now: DateTime<Utc>,
) -> GateDecision<TrendBlock> {
    let bars = fetch_index_bars(data, config, now).await;
    let decision = evaluate_trend(&bars, config.short_window, config.long_window);

    match &decision {
        GateDecision::Allow => info!(symbol = %config.symbol, bars = bars.len(), "📈 Trend gate open, sells allowed"),
        GateDecision::Block(reason) => {
            info!(symbol = %config.symbol, bars = bars.len(), %reason, "📉 Trend gate closed, sells blocked")
        }
    }
    decision
}

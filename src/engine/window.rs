//! # engine::window
//!
//! **Market Window Filter**: may this cycle trade at all?
//!
//! ```text
//! now (UTC) → Eastern calendar
//!     │
//!     ├─ [1] Weekday     Mon–Thu only (Fri/Sat/Sun block)
//!     │
//!     ├─ [2] Broker clock  closed → block
//!     │      query failed → log, fall through to [3]
//!     │
//!     └─ [3] Session hours   09:30 ≤ t < 16:00 ET
//! ```

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use tracing::{debug, info, warn};

use crate::broker::TradingApi;
use crate::models::GateDecision;

/// Session bounds as minutes after Eastern midnight: [09:30, 16:00).
const SESSION_OPEN_MIN: u32 = 9 * 60 + 30;
const SESSION_CLOSE_MIN: u32 = 16 * 60;

#[derive(Debug, Clone, PartialEq)]
pub enum WindowBlock {
    /// Friday through Sunday.
    OffDay(Weekday),
    MarketClosed { next_open: DateTime<Utc> },
    OutsideHours(NaiveTime),
}

impl std::fmt::Display for WindowBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowBlock::OffDay(day) => write!(f, "{day} is outside Monday–Thursday"),
            WindowBlock::MarketClosed { next_open } => write!(f, "market closed (next open {next_open})"),
            WindowBlock::OutsideHours(t) => write!(f, "{t} ET is outside 09:30–16:00"),
        }
    }
}

#[inline]
pub fn is_trading_weekday(day: Weekday) -> bool {
    matches!(day, Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu)
}

/// Inclusive at 09:30:00, exclusive at 16:00:00.
#[inline]
pub fn within_session_hours(t: NaiveTime) -> bool {
    let minute_of_day = t.hour() * 60 + t.minute();
    (SESSION_OPEN_MIN..SESSION_CLOSE_MIN).contains(&minute_of_day)
}

pub async fn check_market_window(
    now: DateTime<Utc>,
    trading: &dyn TradingApi,
) -> GateDecision<WindowBlock> {
    let now_et = now.with_timezone(&New_York);

    // ── 1. Weekday ───────────────────────────────────────────────────────────
    let weekday = now_et.weekday();
    if !is_trading_weekday(weekday) {
        let reason = WindowBlock::OffDay(weekday);
        info!(%reason, "Outside Monday–Thursday; skipping this cycle");
        return GateDecision::Block(reason);
    }

    // ── 2. Broker clock (non-fatal) ──────────────────────────────────────────
    match trading.market_clock().await {
        Ok(clock) if !clock.is_open => {
            info!(next_open = %clock.next_open, "Market closed; skipping this cycle");
            return GateDecision::Block(WindowBlock::MarketClosed { next_open: clock.next_open });
        }
        Ok(_) => debug!("Broker clock reports market open"),
        Err(e) => warn!(error = %e, "Clock check failed; falling back to time window only"),
    }

    // ── 3. Session hours ─────────────────────────────────────────────────────
    let local = now_et.time();
    if !within_session_hours(local) {
        let reason = WindowBlock::OutsideHours(local);
        info!(%reason, "Outside regular hours; skipping this cycle");
        return GateDecision::Block(reason);
    }

    GateDecision::Allow
}

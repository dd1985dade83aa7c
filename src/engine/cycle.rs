//! # engine::cycle
//!
//! **Cycle Orchestrator**: one pass of the decision pipeline.
//!
//! ```text
//! Market Window ──block──▶ done
//!      │ allow
//! Trend Gate ─────block──▶ done
//!      │ allow
//! fetch positions (failure → empty list)
//!      │
//! for each position: decide → hold / skip / sell
//! ```
//!
//! Nothing is carried over between cycles; every input is fetched fresh.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::broker::{MarketDataApi, TradingApi};
use crate::config::Config;
use crate::engine::{
    executor::{process_position, PositionAction},
    trend::{check_trend, TrendBlock},
    window::{check_market_window, WindowBlock},
};
use crate::models::{GateDecision, Position};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub evaluated: usize,
    pub sold:      usize,
    pub held:      usize,
    pub skipped:   usize,
    pub failed:    usize,
}

impl CycleSummary {
    fn record(&mut self, action: &PositionAction) {
        self.evaluated += 1;
        match action {
            PositionAction::Skipped => self.skipped += 1,
            PositionAction::Held => self.held += 1,
            PositionAction::Sold { .. } => self.sold += 1,
            PositionAction::SellFailed { .. } => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    OutsideWindow(WindowBlock),
    TrendBlocked(TrendBlock),
    NoPositions,
    Evaluated(CycleSummary),
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleOutcome::OutsideWindow(reason) => write!(f, "outside trading window: {reason}"),
            CycleOutcome::TrendBlocked(reason) => write!(f, "trend gate blocked: {reason}"),
            CycleOutcome::NoPositions => write!(f, "no positions"),
            CycleOutcome::Evaluated(s) => write!(
                f,
                "evaluated {} (sold {}, held {}, skipped {}, failed {})",
                s.evaluated, s.sold, s.held, s.skipped, s.failed
            ),
        }
    }
}

pub async fn run_cycle(
    trading: &dyn TradingApi,
    data: &dyn MarketDataApi,
    config: &Config,
    now: DateTime<Utc>,
) -> CycleOutcome {
    // ── 1. Trading window ────────────────────────────────────────────────────
    if let GateDecision::Block(reason) = check_market_window(now, trading).await {
        return CycleOutcome::OutsideWindow(reason);
    }

    // ── 2. Broad-market trend ────────────────────────────────────────────────
    if let GateDecision::Block(reason) = check_trend(data, &config.trend, now).await {
        return CycleOutcome::TrendBlocked(reason);
    }

    // ── 3. Positions ─────────────────────────────────────────────────────────
    let positions = fetch_positions(trading).await;
    if positions.is_empty() {
        info!("No positions to evaluate");
        return CycleOutcome::NoPositions;
    }

    info!(
        count  = positions.len(),
        target = %format!("{:.2}%", config.take_profit_pct * 100.0),
        "Evaluating open positions for take-profit"
    );

    // ── 4. Evaluate & liquidate, one position at a time ──────────────────────
    let mut summary = CycleSummary::default();
    for position in &positions {
        let action = process_position(trading, position, config.take_profit_pct).await;
        summary.record(&action);
    }

    CycleOutcome::Evaluated(summary)
}

async fn fetch_positions(trading: &dyn TradingApi) -> Vec<Position> {
    match trading.open_positions().await {
        Ok(positions) => positions,
        Err(e) => {
            error!(error = %e, "Failed to fetch positions; treating as none");
            Vec::new()
        }
    }
}

//! # TakeProfit: long-position take-profit loop
//!
//! ## Architecture Overview
//!
//! ```text
//!  every RUN_EVERY_SECONDS:
//!
//!  ┌────────────────┐  block  ┌──────────────────────────────────┐
//!  │ Market Window  │ ──────▶ │ idle until next tick             │
//!  │ Mon–Thu, 09:30 │         └──────────────────────────────────┘
//!  │ –16:00 ET,     │                        ▲
//!  │ broker clock   │                        │ block
//!  └───────┬────────┘         ┌──────────────┴───────────────────┐
//!          │ allow            │ Trend Gate                       │
//!          └────────────────▶ │ SMA(60) > SMA(240), 15-min index │
//!                             └──────────────┬───────────────────┘
//!                                            │ allow
//!                             ┌──────────────▼───────────────────┐
//!                             │ GET /v2/positions                │
//!                             │ long && gain ≥ TAKE_PROFIT_PCT   │──▶ POST /v2/orders
//!                             │   → market sell, full qty, day   │    (Alpaca)
//!                             └──────────────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable              | Default           | Description                        |
//! |-----------------------|-------------------|------------------------------------|
//! | `APCA_API_KEY_ID`     | required          | Alpaca key id                      |
//! | `APCA_API_SECRET_KEY` | required          | Alpaca secret                      |
//! | `APCA_PAPER`          | `true`            | Paper account                      |
//! | `RUN_EVERY_SECONDS`   | `3600`            | Cycle interval                     |
//! | `TAKE_PROFIT_PCT`     | `0.05`            | Take-profit threshold (fraction)   |
//! | `TREND_BARS_LIMIT`    | `300`             | 15-minute bars requested           |
//! | `DATA_FEED`           | `iex`             | Market-data feed                   |
//! | `TREND_SYMBOL`        | `SPY`             | Reference index                    |
//! | `RUST_LOG`            | `takeprofit=info` | Tracing filter                     |

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod broker;
mod config;
mod engine;
mod error;
mod models;
mod scheduler;

use broker::alpaca::AlpacaClient;
use config::Config;
use engine::cycle::run_cycle;
use scheduler::{run_loop, IntervalTicker};

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional; CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("takeprofit=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════╗
  ║        TAKEPROFIT — Long Position Exits       ║
  ║   Window · Trend · Evaluate · Liquidate       ║
  ╚═══════════════════════════════════════════════╝"#);

    // ── 3. Config (missing credentials end the process here) ─────────────────
    let config = Config::from_env().context("Failed to load config")?;
    let client = AlpacaClient::new(&config).context("Failed to build Alpaca client")?;

    info!(
        mode        = config.mode(),
        interval    = ?config.run_interval,
        take_profit = %format!("{:.2}%", config.take_profit_pct * 100.0),
        index       = %config.trend.symbol,
        feed        = %config.trend.feed,
        "Starting take-profit loop (Mon–Thu 09:30–16:00 ET)"
    );

    // ── 4. Loop forever ──────────────────────────────────────────────────────
    let (client, config) = (&client, &config);
    let mut ticker = IntervalTicker::new(config.run_interval);
    run_loop(&mut ticker, move |now| run_cycle(client, client, config, now)).await;

    Ok(())
}

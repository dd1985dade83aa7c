//! # config: environment configuration
//!
//! Loaded once before the loop starts.  Missing credentials are the only
//! failure the process is allowed to die on, and a malformed value is treated
//! the same way: the loop never starts on a silently substituted default.

use std::time::Duration;

use anyhow::{bail, Context};
use tracing::warn;

const PAPER_TRADING_URL: &str = "https://paper-api.alpaca.markets";
const LIVE_TRADING_URL: &str = "https://api.alpaca.markets";
const MARKET_DATA_URL: &str = "https://data.alpaca.markets";

/// Largest page the bars endpoint serves.
pub const MAX_BARS_LIMIT: usize = 10_000;

/// Trend gate parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    /// Reference index, e.g. `"SPY"`.
    pub symbol: String,
    /// How many 15-minute bars to ask for.
    pub bar_limit: usize,
    /// Configured data feed (`"iex"`, `"sip"`, ...).
    pub feed: String,
    pub short_window: usize,
    /// Also the minimum number of bars needed before sells can be allowed.
    pub long_window: usize,
}

/// Everything the bot needs, read from the environment.
#[derive(Clone)]
pub struct Config {
    pub api_key:         String,
    pub api_secret:      String,
    /// Paper account when `true`.
    pub paper:           bool,
    pub run_interval:    Duration,
    /// Take-profit threshold as a fraction (0.05 = 5%).
    pub take_profit_pct: f64,
    pub trend:           TrendConfig,
    pub trading_url:     String,
    pub data_url:        String,
    pub http_timeout:    Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("paper", &self.paper)
            .field("run_interval", &self.run_interval)
            .field("take_profit_pct", &self.take_profit_pct)
            .field("trend", &self.trend)
            .field("trading_url", &self.trading_url)
            .field("data_url", &self.data_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (api_key, api_secret) = match (var("APCA_API_KEY_ID"), var("APCA_API_SECRET_KEY")) {
            (Some(key), Some(secret)) => (key, secret),
            _ => bail!("APCA_API_KEY_ID and APCA_API_SECRET_KEY must be set"),
        };

        let paper = match var("APCA_PAPER") {
            None => true,
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("APCA_PAPER must be true/false, got '{raw}'"))?,
        };

        let interval_secs: u64 = parse_or(&var, "RUN_EVERY_SECONDS", 3600)?;
        if interval_secs == 0 {
            bail!("RUN_EVERY_SECONDS must be greater than zero");
        }

        let take_profit_pct: f64 = parse_or(&var, "TAKE_PROFIT_PCT", 0.05)?;
        if !take_profit_pct.is_finite() || take_profit_pct < 0.0 {
            bail!("TAKE_PROFIT_PCT must be a non-negative fraction, got {take_profit_pct}");
        }

        let mut trend = TrendConfig {
            symbol:       var("TREND_SYMBOL").unwrap_or_else(|| "SPY".to_string()),
            bar_limit:    parse_or(&var, "TREND_BARS_LIMIT", 300)?,
            feed:         var("DATA_FEED").unwrap_or_else(|| "iex".to_string()),
            short_window: parse_or(&var, "TREND_SHORT_WINDOW", 60)?,
            long_window:  parse_or(&var, "TREND_LONG_WINDOW", 240)?,
        };
        if trend.short_window == 0 || trend.short_window >= trend.long_window {
            bail!(
                "TREND_SHORT_WINDOW ({}) must be non-zero and below TREND_LONG_WINDOW ({})",
                trend.short_window,
                trend.long_window
            );
        }
        if trend.bar_limit < trend.long_window {
            warn!(
                bar_limit   = trend.bar_limit,
                long_window = trend.long_window,
                "TREND_BARS_LIMIT is below TREND_LONG_WINDOW; the trend gate will block every sell"
            );
        }
        if trend.bar_limit > MAX_BARS_LIMIT {
            warn!(requested = trend.bar_limit, max = MAX_BARS_LIMIT, "TREND_BARS_LIMIT capped to one data page");
            trend.bar_limit = MAX_BARS_LIMIT;
        }

        let timeout_secs: u64 = parse_or(&var, "HTTP_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let default_trading = if paper { PAPER_TRADING_URL } else { LIVE_TRADING_URL };

        Ok(Self {
            api_key,
            api_secret,
            paper,
            run_interval:    Duration::from_secs(interval_secs),
            take_profit_pct,
            trend,
            trading_url:     trim_url(var("APCA_API_BASE_URL").unwrap_or_else(|| default_trading.to_string())),
            data_url:        trim_url(var("APCA_DATA_BASE_URL").unwrap_or_else(|| MARKET_DATA_URL.to_string())),
            http_timeout:    Duration::from_secs(timeout_secs),
        })
    }

    /// `"paper"` or `"live"`, for log lines.
    pub fn mode(&self) -> &'static str {
        if self.paper { "paper" } else { "live" }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a number, got '{raw}'")),
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
impl Config {
    /// Paper config with default tuning and dummy credentials.
    pub fn for_tests() -> Self {
        Self::from_lookup(|key| match key {
            "APCA_API_KEY_ID" => Some("PKTEST".to_string()),
            "APCA_API_SECRET_KEY" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap()
    }
}

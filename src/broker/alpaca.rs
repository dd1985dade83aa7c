//! # broker::alpaca
//!
//! REST client for Alpaca's trading and market-data APIs.
//!
//! ## Endpoints used
//!
//! | Method | Path                                  | Purpose                     |
//! |--------|---------------------------------------|-----------------------------|
//! | GET    | `{trading}/v2/clock`                  | market open flag            |
//! | GET    | `{trading}/v2/positions`              | open positions              |
//! | POST   | `{trading}/v2/orders`                 | market sell, day            |
//! | GET    | `{data}/v2/stocks/{symbol}/bars`      | 15-minute index bars        |

use anyhow::Context;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::broker::{MarketDataApi, TradingApi};
use crate::config::Config;
use crate::error::{BrokerError, BrokerResult};
use crate::models::{
    bar::{BarsPage, BAR_TIMEFRAME},
    position::PositionRecord,
    BarsRequest, MarketClock, OrderAck, OrderRequest, Position, PriceBar,
};

/// Longest response-body excerpt carried into an error message.
const BODY_EXCERPT: usize = 300;

pub struct AlpacaClient {
    http:        reqwest::Client,
    trading_url: String,
    data_url:    String,
}

impl AlpacaClient {
    /// Builds one pooled HTTP client with the auth headers baked in.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apca-api-key-id",
            HeaderValue::from_str(&config.api_key).context("APCA_API_KEY_ID is not a valid header value")?,
        );
        let mut secret = HeaderValue::from_str(&config.api_secret)
            .context("APCA_API_SECRET_KEY is not a valid header value")?;
        secret.set_sensitive(true);
        headers.insert("apca-api-secret-key", secret);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            trading_url: config.trading_url.clone(),
            data_url:    config.data_url.clone(),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        is_order: bool,
    ) -> BrokerResult<T> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(BrokerError::from_status(status.as_u16(), excerpt(&body), is_order));
        }

        serde_json::from_str(&body).map_err(|e| BrokerError::Decode(format!("{e}: {}", excerpt(&body))))
    }
}

#[async_trait]
impl TradingApi for AlpacaClient {
    async fn market_clock(&self) -> BrokerResult<MarketClock> {
        let url = format!("{}/v2/clock", self.trading_url);
        self.send_json(self.http.get(&url), false).await
    }

    async fn open_positions(&self) -> BrokerResult<Vec<Position>> {
        let url = format!("{}/v2/positions", self.trading_url);
        let records: Vec<PositionRecord> = self.send_json(self.http.get(&url), false).await?;
        debug!(count = records.len(), "Positions fetched");
        Ok(records.into_iter().map(Position::from).collect())
    }

    async fn submit_order(&self, order: &OrderRequest) -> BrokerResult<OrderAck> {
        let url = format!("{}/v2/orders", self.trading_url);
        self.send_json(self.http.post(&url).json(order), true).await
    }
}

#[async_trait]
impl MarketDataApi for AlpacaClient {
    async fn price_bars(&self, request: &BarsRequest) -> BrokerResult<Vec<PriceBar>> {
        let url = format!("{}/v2/stocks/{}/bars", self.data_url, request.symbol);

        // `sort=desc` + `limit` gives the most recent bars in one page.
        let query = [
            ("timeframe", BAR_TIMEFRAME.to_string()),
            ("start", request.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", request.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("limit", request.limit.to_string()),
            ("feed", request.feed.clone()),
            ("sort", "desc".to_string()),
        ];

        let page: BarsPage = self.send_json(self.http.get(&url).query(&query), false).await?;
        let bars: Vec<PriceBar> = page.bars.unwrap_or_default().into_iter().map(PriceBar::from).collect();

        debug!(
            symbol = %request.symbol,
            feed   = %request.feed,
            count  = bars.len(),
            more   = page.next_page_token.is_some(),
            "Bars fetched"
        );
        Ok(bars)
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

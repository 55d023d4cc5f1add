//! Binance spot kline client.
//!
//! Fetches the most recent candles for an instrument from the public
//! `/api/v3/klines` endpoint with client-side rate limiting.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use crypto_signal_core::{Candle, ExchangeConfig, Interval, MarketDataProvider};
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// Binance spot API base URL
pub const BINANCE_SPOT_API: &str = "https://api.binance.com";

/// Binance caps a single klines request at 1000 candles
const MAX_CANDLES_PER_REQUEST: usize = 1000;

const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Market data provider backed by Binance spot klines.
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl BinanceClient {
    /// Creates a client against the public Binance spot API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(BINANCE_SPOT_API, DEFAULT_RATE_LIMIT_PER_SECOND)
    }

    /// Creates a client from the `[exchange]` config section.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the rate limit is zero.
    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        Self::with_config(&config.api_url, config.rate_limit_per_second)
    }

    /// Creates a client with a custom base URL and request rate.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the rate limit is zero.
    pub fn with_config(base_url: &str, rate_limit_per_second: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let per_second = NonZeroU32::new(rate_limit_per_second)
            .ok_or_else(|| anyhow!("Rate limit must be > 0"))?;
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/api/v3/klines", self.base_url);
        let pair = exchange_symbol(symbol);
        let limit = limit.clamp(1, MAX_CANDLES_PER_REQUEST);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.as_str()),
                ("interval", interval.as_str()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Binance API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Binance API error ({status}): {error_text}");
        }

        let data: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .context("Failed to parse Binance API response")?;

        let candles = parse_klines(&data);
        if candles.is_empty() {
            bail!("Binance returned no candles for {pair} {interval}");
        }

        debug!(
            symbol,
            interval = %interval,
            received = data.len(),
            parsed = candles.len(),
            "Fetched klines"
        );
        Ok(candles)
    }
}

/// Maps an instrument identifier like `BTC/USDT` to the exchange symbol `BTCUSDT`.
#[must_use]
pub fn exchange_symbol(symbol: &str) -> String {
    symbol.chars().filter(|&c| c != '/').collect()
}

/// Parses a klines payload, skipping malformed rows, oldest first.
fn parse_klines(data: &[Vec<serde_json::Value>]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = data.iter().filter_map(|k| parse_kline(k)).collect();
    candles.sort_by_key(|c| c.open_time);
    candles
}

/// Parses a single kline.
///
/// Binance kline format:
/// ```text
/// [
///   1499040000000,      // 0: Open time
///   "0.01634000",       // 1: Open
///   "0.80000000",       // 2: High
///   "0.01575800",       // 3: Low
///   "0.01577100",       // 4: Close
///   "148976.11427815",  // 5: Volume
///   1499644799999,      // 6: Close time
///   ...
/// ]
/// ```
fn parse_kline(kline: &[serde_json::Value]) -> Option<Candle> {
    if kline.len() < 6 {
        return None;
    }

    let open_time = Utc.timestamp_millis_opt(kline[0].as_i64()?).single()?;

    Some(Candle::new(
        open_time,
        parse_f64_from_json(&kline[1])?,
        parse_f64_from_json(&kline[2])?,
        parse_f64_from_json(&kline[3])?,
        parse_f64_from_json(&kline[4])?,
        parse_f64_from_json(&kline[5])?,
    ))
}

/// Prices arrive as strings; accept plain numbers too.
fn parse_f64_from_json(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

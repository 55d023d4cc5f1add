use crate::candle::{Candle, Interval};
use anyhow::Result;
use async_trait::async_trait;

/// Source of historical candles.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the most recent `limit` candles, ordered oldest to newest.
    async fn fetch_candles(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>>;
}

/// Text markup understood by the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Markdown,
    Plain,
}

/// Outbound notification channel.
///
/// Delivery is fire-and-forget: callers log failures and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str, format: MessageFormat) -> Result<()>;
}

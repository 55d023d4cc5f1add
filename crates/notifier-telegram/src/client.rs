//! Telegram Bot API notifier.
//!
//! Posts messages to one chat through `sendMessage`. The bot token is part of
//! the request path and is kept out of every log line and error message.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use crypto_signal_core::{MessageFormat, Notifier, TelegramConfig};
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// Telegram Bot API base URL
pub const TELEGRAM_API: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

impl<'a> SendMessageRequest<'a> {
    #[must_use]
    pub const fn new(chat_id: &'a str, text: &'a str, format: MessageFormat) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: parse_mode(format),
        }
    }
}

/// Envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// `Notifier` that delivers to a Telegram chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl TelegramNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        Self::with_base_url(TELEGRAM_API, bot_token, chat_id)
    }

    /// Creates a notifier from the `[telegram]` config section.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        Self::with_base_url(&config.api_url, config.bot_token.clone(), config.chat_id.clone())
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        // Telegram allows roughly one message per second to a single chat
        let quota = Quota::per_second(NonZeroU32::MIN);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str, format: MessageFormat) -> Result<()> {
        self.rate_limiter.until_ready().await;

        let body = SendMessageRequest::new(&self.chat_id, text, format);
        // reqwest errors embed the URL, which carries the token
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach Telegram API: {}", e.without_url()))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read Telegram response: {}", e.without_url()))?;

        check_response(status, &payload)?;
        debug!(chat_id = %self.chat_id, chars = text.len(), "Telegram message delivered");
        Ok(())
    }
}

const fn parse_mode(format: MessageFormat) -> Option<&'static str> {
    match format {
        MessageFormat::Markdown => Some("Markdown"),
        MessageFormat::Plain => None,
    }
}

/// Both the HTTP status and the `ok` flag must report success.
fn check_response(status: reqwest::StatusCode, payload: &str) -> Result<()> {
    let parsed: Option<ApiResponse> = serde_json::from_str(payload).ok();

    match parsed {
        Some(api) if status.is_success() && api.ok => Ok(()),
        Some(api) => bail!(
            "Telegram API error ({status}, code {}): {}",
            api.error_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
            api.description.unwrap_or_default()
        ),
        None if status.is_success() => bail!("Unrecognised Telegram response: {payload}"),
        None => bail!("Telegram API error ({status}): {payload}"),
    }
}

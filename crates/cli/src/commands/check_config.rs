//! Configuration check command.

use super::load_config;
use anyhow::{Context, Result};
use clap::Args;
use crypto_signal_core::AppConfig;

/// Arguments for the check-config command.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Validates the effective configuration and prints it with the bot token masked.
///
/// Missing Telegram credentials are reported but do not fail the check,
/// since `scan --dry-run` runs without them.
///
/// # Errors
/// Returns an error if configuration cannot be loaded or is invalid.
pub fn run_check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    println!("{}", render(&config)?);

    match config.validate_telegram() {
        Ok(()) => println!("Configuration OK"),
        Err(e) => println!("Configuration OK for dry runs only: {e}"),
    }
    Ok(())
}

fn render(config: &AppConfig) -> Result<String> {
    serde_json::to_string_pretty(&config.redacted()).context("Failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_masks_token() {
        let mut config = AppConfig::default();
        config.telegram.bot_token = "123:SECRET".to_string();
        config.telegram.chat_id = "42".to_string();

        let text = render(&config).unwrap();

        assert!(!text.contains("SECRET"));
        assert!(text.contains("\"bot_token\": \"***\""));
        assert!(text.contains("\"chat_id\": \"42\""));
        assert!(text.contains("\"higher_timeframe\": \"4h\""));
    }
}

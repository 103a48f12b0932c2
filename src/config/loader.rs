//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Upper bound for `api.max_retries`.
const MAX_RETRIES: u32 = 10;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    ws_url = %config.feed.ws_url,
    base_url = %config.api.base_url,
    symbols = config.trading.supported_symbols.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Feed validation
  anyhow::ensure!(
    config.feed.ws_url.starts_with("ws://") || config.feed.ws_url.starts_with("wss://"),
    "Feed ws_url must be a ws:// or wss:// URL, got {}",
    config.feed.ws_url
  );
  anyhow::ensure!(
    config.feed.reconnect_step_ms > 0,
    "reconnect_step_ms must be positive"
  );
  anyhow::ensure!(
    config.feed.reconnect_cap_ms >= config.feed.reconnect_step_ms,
    "reconnect_cap_ms ({}) must be >= reconnect_step_ms ({})",
    config.feed.reconnect_cap_ms,
    config.feed.reconnect_step_ms
  );

  // API validation
  anyhow::ensure!(
    config.api.base_url.starts_with("http://") || config.api.base_url.starts_with("https://"),
    "API base_url must be an http(s) URL, got {}",
    config.api.base_url
  );
  anyhow::ensure!(
    !config.api.base_url.ends_with('/'),
    "API base_url must not end with '/'"
  );
  anyhow::ensure!(
    config.api.timeout_seconds > 0,
    "timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.api.max_retries <= MAX_RETRIES,
    "max_retries ({}) must be <= {}",
    config.api.max_retries,
    MAX_RETRIES
  );

  // Trading validation
  anyhow::ensure!(
    !config.trading.supported_symbols.is_empty(),
    "At least one supported symbol must be configured"
  );
  for (i, symbol) in config.trading.supported_symbols.iter().enumerate() {
    anyhow::ensure!(
      !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
      "Symbol {} ({:?}) must be non-empty uppercase ASCII",
      i,
      symbol
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.feed.ws_url, "ws://localhost:8080/ws");
    assert_eq!(config.api.base_url, "http://localhost:8080");
    assert_eq!(config.trading.supported_symbols, vec!["BTC", "ETH", "ADA"]);
    let policy = config.feed.reconnect_policy();
    assert_eq!(policy.delay(3).as_millis(), 3000);
    assert_eq!(policy.delay(9).as_millis(), 5000);
  }

  #[test]
  fn test_overrides() {
    let config = parse_config(
      r#"
      [feed]
      ws_url = "wss://prices.example.com/ws"
      reconnect_step_ms = 250
      reconnect_cap_ms = 1000

      [trading]
      supported_symbols = ["BTC"]
      "#,
    )
    .unwrap();
    assert_eq!(config.feed.reconnect_policy().delay(10).as_millis(), 1000);
    assert_eq!(config.trading.supported_symbols, vec!["BTC"]);
    assert_eq!(config.api.max_retries, 3);
  }

  #[test]
  fn test_rejects_invalid_values() {
    assert!(parse_config("[feed]\nws_url = \"http://nope\"").is_err());
    assert!(parse_config("[feed]\nreconnect_step_ms = 0").is_err());
    assert!(parse_config("[feed]\nreconnect_step_ms = 2000\nreconnect_cap_ms = 1000").is_err());
    assert!(parse_config("[api]\nbase_url = \"http://localhost:8080/\"").is_err());
    assert!(parse_config("[trading]\nsupported_symbols = []").is_err());
    assert!(parse_config("[trading]\nsupported_symbols = [\"btc\"]").is_err());
  }

  #[test]
  fn test_max_retries_bounded() {
    assert!(parse_config("[api]\nmax_retries = 10").is_ok());
    assert!(parse_config("[api]\nmax_retries = 40\nretry_base_delay_ms = 0").is_err());
  }
}

//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Endpoints, backoff parameters and the tradable symbols are
//! externalized here - nothing is hardcoded in the usecases layer.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::backoff::ReconnectPolicy;
use crate::domain::trade::DEFAULT_SYMBOLS;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and logging.
  #[serde(default)]
  pub client: ClientConfig,
  /// Streaming price feed.
  #[serde(default)]
  pub feed: FeedConfig,
  /// Trading backend REST endpoints.
  #[serde(default)]
  pub api: ApiConfig,
  /// Order entry constraints.
  #[serde(default)]
  pub trading: TradingConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable client name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Price feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// WebSocket URL of the price stream.
  #[serde(default = "default_ws_url")]
  pub ws_url: String,
  /// Backoff increment per failed attempt (milliseconds).
  #[serde(default = "default_reconnect_step")]
  pub reconnect_step_ms: u64,
  /// Maximum backoff delay (milliseconds).
  #[serde(default = "default_reconnect_cap")]
  pub reconnect_cap_ms: u64,
}

impl FeedConfig {
  pub const fn reconnect_policy(&self) -> ReconnectPolicy {
    ReconnectPolicy::new(
      Duration::from_millis(self.reconnect_step_ms),
      Duration::from_millis(self.reconnect_cap_ms),
    )
  }
}

/// REST API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Backend base URL (no trailing slash).
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Retries for the trade history query. Orders are never retried.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay between history query retries (milliseconds).
  #[serde(default = "default_retry_base")]
  pub retry_base_delay_ms: u64,
}

/// Order entry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
  /// Symbols the order form accepts.
  #[serde(default = "default_symbols")]
  pub supported_symbols: Vec<String>,
}

/// Metrics and health configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Serve /live, /ready and /metrics.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Bind address for the health/metrics server.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      ws_url: default_ws_url(),
      reconnect_step_ms: default_reconnect_step(),
      reconnect_cap_ms: default_reconnect_cap(),
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_seconds: default_timeout(),
      max_retries: default_max_retries(),
      retry_base_delay_ms: default_retry_base(),
    }
  }
}

impl Default for TradingConfig {
  fn default() -> Self {
    Self {
      supported_symbols: default_symbols(),
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "crypto-dashboard".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_ws_url() -> String {
  "ws://localhost:8080/ws".to_string()
}

fn default_reconnect_step() -> u64 {
  1000
}

fn default_reconnect_cap() -> u64 {
  5000
}

fn default_base_url() -> String {
  "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
  10
}

fn default_max_retries() -> u32 {
  3
}

fn default_retry_base() -> u64 {
  200
}

fn default_symbols() -> Vec<String> {
  DEFAULT_SYMBOLS.iter().map(ToString::to_string).collect()
}

fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "127.0.0.1:9090".to_string()
}

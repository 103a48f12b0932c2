//! Backend HTTP Client - reqwest wrapper for the trading REST API
//!
//! Two request shapes only: a single-shot JSON POST for orders and a
//! retried GET for idempotent queries.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Failure of a single backend request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// The request never produced a response (connect, timeout, body read).
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The backend answered with a non-success status.
  #[error("API error {status}: {body}")]
  Status {
    status: StatusCode,
    body: String,
  },
}

impl ApiError {
  /// Whether a GET may be retried after this failure.
  fn is_transient(&self) -> bool {
    match self {
      Self::Transport(_) => true,
      Self::Status { status, .. } => {
        status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
      }
    }
  }
}

/// Configuration for the backend HTTP client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
  /// Base URL, e.g. `http://localhost:8080`.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum retries for GET requests.
  pub max_retries: u32,
  /// Base delay between GET retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl Default for ApiClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8080".to_string(),
      timeout: Duration::from_secs(10),
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
    }
  }
}

impl From<&crate::config::ApiConfig> for ApiClientConfig {
  fn from(config: &crate::config::ApiConfig) -> Self {
    Self {
      base_url: config.base_url.clone(),
      timeout: Duration::from_secs(config.timeout_seconds),
      max_retries: config.max_retries,
      retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
    }
  }
}

/// HTTP client for the trading backend.
pub struct ApiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ApiClientConfig,
}

impl ApiClient {
  /// Create a new backend client.
  pub fn new(config: ApiClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, config })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  /// POST a JSON body. Exactly one attempt, never retried.
  pub async fn post_json<T: Serialize + ?Sized>(
    &self,
    path: &str,
    body: &T,
  ) -> Result<Response, ApiError> {
    let url = format!("{}{}", self.config.base_url, path);
    let response = self.http.post(&url).json(body).send().await?;
    Self::check_status(response).await
  }

  /// GET with exponential-backoff retries on transient failures.
  pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
    let url = format!("{}{}", self.config.base_url, path);
    let mut attempt = 0;

    loop {
      if attempt > 0 {
        let delay = retry_delay(self.config.retry_base_delay, attempt);
        debug!(attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      let result = match self.http.get(&url).send().await {
        Ok(response) => Self::check_status(response).await,
        Err(e) => Err(ApiError::from(e)),
      };

      match result {
        Ok(response) => return Ok(response),
        Err(e) if e.is_transient() && attempt < self.config.max_retries => {
          warn!(error = %e, attempt, path, "Request failed, retrying");
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }

  /// Turn non-success statuses into `ApiError::Status`.
  async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
  }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// saturating instead of overflowing.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
  base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_retry_delay_doubles() {
    let base = Duration::from_millis(200);
    assert_eq!(retry_delay(base, 1), Duration::from_millis(200));
    assert_eq!(retry_delay(base, 2), Duration::from_millis(400));
    assert_eq!(retry_delay(base, 4), Duration::from_millis(1600));
  }

  #[test]
  fn test_retry_delay_saturates_for_large_attempts() {
    assert_eq!(retry_delay(Duration::ZERO, 40), Duration::ZERO);
    assert_eq!(retry_delay(Duration::from_millis(1), 33), Duration::from_millis(u64::from(u32::MAX)));
    assert_eq!(retry_delay(Duration::from_secs(u64::MAX), 64), Duration::MAX);
  }

  #[test]
  fn test_transient_statuses() {
    let status = |code: u16| ApiError::Status {
      status: StatusCode::from_u16(code).unwrap(),
      body: String::new(),
    };
    assert!(status(500).is_transient());
    assert!(status(503).is_transient());
    assert!(status(429).is_transient());
    assert!(!status(400).is_transient());
    assert!(!status(404).is_transient());
  }
}

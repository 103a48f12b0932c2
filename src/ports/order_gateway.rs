//! Order Gateway Port - Trading Backend Interface
//!
//! Defines the two backend calls the client depends on:
//! order acceptance and the trade history query.
//!
//! Key design decisions:
//! - One call is one round trip; no retries behind `place_order`
//! - The gateway builds confirmations from the backend response only

use async_trait::async_trait;

use crate::domain::trade::{OrderRequest, TradeConfirmation, TradeRecord};
use crate::error::{LedgerError, SubmissionError};

/// Trait for trading backends.
#[async_trait]
pub trait OrderGateway: Send + Sync + 'static {
  /// Submit one order and wait for the backend's verdict.
  ///
  /// # Errors
  /// Transport failures, non-success statuses, and unparseable
  /// responses all map to `SubmissionError`.
  async fn place_order(&self, order: &OrderRequest) -> Result<TradeConfirmation, SubmissionError>;

  /// Fetch the full trade history in backend order.
  async fn fetch_trades(&self) -> Result<Vec<TradeRecord>, LedgerError>;
}

//! Backend API Request/Response Types
//!
//! Wire shapes of `POST /order`. The trade history rows deserialize
//! straight into `domain::trade::TradeRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::trade::{
  deserialize_timestamp, OrderRequest, Side, TradeConfirmation, TradeId,
};
use crate::error::SubmissionError;

/// Order request payload: `{symbol, type, amount}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload<'a> {
  pub symbol: &'a str,
  #[serde(rename = "type")]
  pub side: Side,
  pub amount: f64,
}

impl<'a> From<&'a OrderRequest> for OrderPayload<'a> {
  fn from(order: &'a OrderRequest) -> Self {
    Self {
      symbol: order.symbol(),
      side: order.side(),
      amount: order.quantity(),
    }
  }
}

/// Successful order response: `{symbol, type, amount, price}` plus the
/// optional `id` and `datetime` the backend adds once the trade is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
  pub symbol: String,
  #[serde(rename = "type")]
  pub side: Side,
  pub amount: f64,
  pub price: f64,
  #[serde(default)]
  pub id: Option<TradeId>,
  #[serde(rename = "datetime", default, deserialize_with = "deserialize_timestamp")]
  pub executed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderResponse> for TradeConfirmation {
  type Error = SubmissionError;

  fn try_from(resp: OrderResponse) -> Result<Self, Self::Error> {
    if resp.symbol.is_empty() {
      return Err(SubmissionError::MalformedResponse("empty symbol".to_string()));
    }
    if !resp.price.is_finite() || resp.price < 0.0 {
      return Err(SubmissionError::MalformedResponse(format!(
        "invalid price {}",
        resp.price
      )));
    }
    if !resp.amount.is_finite() || resp.amount <= 0.0 {
      return Err(SubmissionError::MalformedResponse(format!(
        "invalid amount {}",
        resp.amount
      )));
    }

    Ok(Self {
      id: resp.id,
      symbol: resp.symbol,
      side: resp.side,
      quantity: resp.amount,
      executed_price: resp.price,
      executed_at: resp.executed_at,
    })
  }
}

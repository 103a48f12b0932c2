//! HTTP Order Gateway — Adapter for Order Placement and Trade History
//!
//! Implements the `OrderGateway` port on top of the shared `ApiClient`.
//! `POST /order` is a single round trip; `GET /trades` is retried by the
//! client on transient failures.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::{ApiClient, ApiError};
use super::types::{OrderPayload, OrderResponse};
use crate::domain::trade::{OrderRequest, TradeConfirmation, TradeRecord};
use crate::error::{LedgerError, SubmissionError};
use crate::ports::order_gateway::OrderGateway;

/// Order gateway backed by the shared HTTP client.
pub struct HttpOrderGateway {
    client: Arc<ApiClient>,
}

impl HttpOrderGateway {
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e.to_string()),
            ApiError::Status { status, body } => Self::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            },
        }
    }
}

impl From<ApiError> for LedgerError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e.to_string()),
            ApiError::Status { status, .. } => Self::Status(status.as_u16()),
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[instrument(skip(self, order), fields(symbol = %order.symbol(), side = %order.side(), quantity = order.quantity()))]
    async fn place_order(&self, order: &OrderRequest) -> Result<TradeConfirmation, SubmissionError> {
        let payload = OrderPayload::from(order);

        let response = self.client.post_json("/order", &payload).await?;

        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let parsed: OrderResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Order response is not a valid confirmation");
            SubmissionError::MalformedResponse(e.to_string())
        })?;

        TradeConfirmation::try_from(parsed)
    }

    #[instrument(skip(self))]
    async fn fetch_trades(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        let response = self.client.get("/trades").await?;

        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        // An empty history may come back as `null`.
        let trades: Option<Vec<TradeRecord>> =
            serde_json::from_str(&body).map_err(|e| LedgerError::Malformed(e.to_string()))?;
        let trades = trades.unwrap_or_default();

        debug!(count = trades.len(), "Trade history fetched");
        Ok(trades)
    }
}

//! Trade Submission Flow - one order, one round trip, one outcome
//!
//! Submits a user order to the backend and resolves to the backend's
//! confirmation or a `SubmissionError`. No retries, no request
//! coalescing, and no shared state is touched: refreshing the trade
//! history is left to whoever owns the ledger.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::trade::{OrderRequest, TradeConfirmation};
use crate::error::SubmissionError;
use crate::ports::order_gateway::OrderGateway;

pub struct TradeSubmissionFlow<G: OrderGateway> {
    gateway: Arc<G>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<G: OrderGateway> Clone for TradeSubmissionFlow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            metrics: self.metrics.clone(),
        }
    }
}

impl<G: OrderGateway> TradeSubmissionFlow<G> {
    pub const fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Submit exactly one order.
    ///
    /// Independent of any other in-flight submission; callers may run
    /// several concurrently.
    ///
    /// # Errors
    /// Any network failure, non-success status or malformed response.
    #[instrument(
        skip(self, order),
        fields(
            request_id = %Uuid::new_v4(),
            symbol = %order.symbol(),
            side = %order.side(),
            quantity = order.quantity(),
        )
    )]
    pub async fn submit(&self, order: &OrderRequest) -> Result<TradeConfirmation, SubmissionError> {
        let started = Instant::now();
        let result = self.gateway.place_order(order).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(confirmation) => {
                info!(
                    executed_price = confirmation.executed_price,
                    trade_id = ?confirmation.id,
                    elapsed_ms,
                    "Trade successful: {confirmation}"
                );
            }
            Err(e) => {
                warn!(error = %e, elapsed_ms, "Order submission failed");
            }
        }

        self.record(order, &result, elapsed_ms);
        result
    }

    /// Issue the round trip on its own task.
    ///
    /// The request runs to completion even if the returned handle is
    /// dropped; its outcome is then only logged.
    pub fn spawn_submit(&self, order: OrderRequest) -> JoinHandle<Result<TradeConfirmation, SubmissionError>> {
        let flow = self.clone();
        tokio::spawn(async move { flow.submit(&order).await })
    }

    fn record(
        &self,
        order: &OrderRequest,
        result: &Result<TradeConfirmation, SubmissionError>,
        elapsed_ms: f64,
    ) {
        let Some(m) = &self.metrics else {
            return;
        };
        let side = order.side().to_string();
        let labels = [order.symbol(), side.as_str()];
        let outcome = if result.is_ok() {
            m.orders_confirmed.with_label_values(&labels).inc();
            "confirmed"
        } else {
            m.orders_failed.with_label_values(&labels).inc();
            "failed"
        };
        m.order_latency_ms
            .with_label_values(&[outcome])
            .observe(elapsed_ms);
    }
}

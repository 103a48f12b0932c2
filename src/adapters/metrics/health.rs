//! Health Check Server - Liveness, Readiness and Metrics
//!
//! Exposes /live, /ready and /metrics via axum 0.7.
//! Readiness follows the price feed connection flag.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument};

use super::prometheus::MetricsRegistry;

/// State shared with the probe handlers.
#[derive(Clone)]
struct HealthState {
    /// Price feed connection flag.
    feed_connected: watch::Receiver<bool>,
    metrics: Arc<MetricsRegistry>,
}

/// Axum-based health and metrics HTTP server.
pub struct HealthServer {
    state: HealthState,
}

impl HealthServer {
    pub const fn new(feed_connected: watch::Receiver<bool>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            state: HealthState {
                feed_connected,
                metrics,
            },
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/live", get(|| async { StatusCode::OK }))
            .route("/ready", get(ready))
            .route("/metrics", get(metrics))
            .with_state(self.state.clone())
    }

    /// Serve on an already-bound listener until shutdown.
    #[instrument(skip_all)]
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router();
        info!(address = ?listener.local_addr().ok(), "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

async fn ready(State(state): State<HealthState>) -> StatusCode {
    if *state.feed_connected.borrow() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<HealthState>) -> String {
    state.metrics.render()
}

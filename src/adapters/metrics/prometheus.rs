//! Prometheus Metrics Registry - Client Observability
//!
//! Registers feed and order-flow metrics. All metrics follow the naming
//! convention `dashboard_client_*`.

use ::prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Centralized Prometheus metrics for the client.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Feed connection status (1 = open, 0 = otherwise).
    pub feed_connected: IntGauge,
    /// Reconnection attempts scheduled.
    pub feed_reconnects: IntCounter,
    /// Well-formed snapshots applied.
    pub snapshots_received: IntCounter,
    /// Frames discarded as malformed.
    pub malformed_frames: IntCounter,
    /// Confirmed orders.
    pub orders_confirmed: IntCounterVec,
    /// Failed orders.
    pub orders_failed: IntCounterVec,
    /// Order round-trip latency in milliseconds.
    pub order_latency_ms: HistogramVec,
}

impl MetricsRegistry {
    /// Create and register all metrics on a private registry.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let feed_connected = IntGauge::new(
            "dashboard_client_feed_connected",
            "Price feed connection status (1=open, 0=not open)",
        )?;

        let feed_reconnects = IntCounter::new(
            "dashboard_client_feed_reconnects_total",
            "Reconnection attempts scheduled after a lost feed connection",
        )?;

        let snapshots_received = IntCounter::new(
            "dashboard_client_snapshots_total",
            "Price snapshots applied",
        )?;

        let malformed_frames = IntCounter::new(
            "dashboard_client_malformed_frames_total",
            "Feed frames discarded because they failed to parse",
        )?;

        let orders_confirmed = IntCounterVec::new(
            Opts::new("dashboard_client_orders_confirmed_total", "Orders confirmed by the backend"),
            &["symbol", "side"],
        )?;

        let orders_failed = IntCounterVec::new(
            Opts::new("dashboard_client_orders_failed_total", "Orders that failed"),
            &["symbol", "side"],
        )?;

        let order_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "dashboard_client_order_latency_ms",
                "Order round-trip latency in milliseconds",
            )
            .buckets(vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]),
            &["outcome"],
        )?;

        registry.register(Box::new(feed_connected.clone()))?;
        registry.register(Box::new(feed_reconnects.clone()))?;
        registry.register(Box::new(snapshots_received.clone()))?;
        registry.register(Box::new(malformed_frames.clone()))?;
        registry.register(Box::new(orders_confirmed.clone()))?;
        registry.register(Box::new(orders_failed.clone()))?;
        registry.register(Box::new(order_latency_ms.clone()))?;

        Ok(Self {
            registry,
            feed_connected,
            feed_reconnects,
            snapshots_received,
            malformed_frames,
            orders_confirmed,
            orders_failed,
            order_latency_ms,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

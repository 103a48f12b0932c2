//! Metrics and Monitoring Adapters
//!
//! Prometheus metrics and the /live, /ready, /metrics endpoints
//! served via axum 0.7.

pub mod health;
pub mod prometheus;

pub use health::HealthServer;
pub use self::prometheus::MetricsRegistry;

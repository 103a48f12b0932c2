//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, WebSocket, metrics server).
//!
//! Adapter categories:
//! - `api`: trading backend REST client (orders, trade history)
//! - `feeds`: streaming price feed over WebSocket
//! - `metrics`: Prometheus metrics export and health checks

pub mod api;
pub mod feeds;
pub mod metrics;

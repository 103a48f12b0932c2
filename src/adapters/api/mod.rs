//! Trading Backend REST API Adapter
//!
//! Implements the HTTP side of the client: order submission and the
//! trade history query.
//!
//! Sub-modules:
//! - `client`: reqwest wrapper with timeouts and GET retries
//! - `orders`: `OrderGateway` implementation
//! - `types`: request/response wire types

pub mod client;
pub mod orders;
pub mod types;

pub use client::{ApiClient, ApiClientConfig};
pub use orders::HttpOrderGateway;

//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceStreamConnector` / `PriceStream`: streaming price feed
//! - `OrderGateway`: order acceptance and trade history

pub mod order_gateway;
pub mod price_stream;

pub use order_gateway::OrderGateway;
pub use price_stream::{PriceStream, PriceStreamConnector};

//! Market Data Feed Adapters - Real-time Price Streaming
//!
//! - `ws`: WebSocket transport for the dashboard price stream

pub mod ws;

pub use ws::WsPriceConnector;

//! Domain layer - Core types and the feed connection state machine.
//!
//! No I/O in here (hexagonal architecture inner ring).
//! Everything is testable in isolation.

pub mod backoff;
pub mod connection;
pub mod prices;
pub mod trade;

// Re-export core types for convenience
pub use backoff::ReconnectPolicy;
pub use connection::{ConnectionState, FeedStateMachine};
pub use prices::PriceSnapshot;
pub use trade::{
    OrderRequest, Side, Symbol, TradeConfirmation, TradeId, TradeRecord, DEFAULT_SYMBOLS,
};

//! Use Cases Layer - Application Orchestration
//!
//! Wires domain logic to ports:
//! - `PriceFeedClient`: streaming snapshot with reconnect/backoff
//! - `TradeSubmissionFlow`: order round trip with a typed outcome
//! - `TradeLedger`: trade history store

pub mod price_feed;
pub mod trade_ledger;
pub mod trade_submission;

pub use price_feed::{PriceFeedClient, PriceFeedHandle};
pub use trade_ledger::TradeLedger;
pub use trade_submission::TradeSubmissionFlow;

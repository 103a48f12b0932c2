//! Error taxonomy for the price feed and order flow.
//!
//! Feed-side errors (`TransportError`, `MalformedMessageError`) are
//! absorbed by the reconnection state machine and only ever logged.
//! `SubmissionError` is the single terminal outcome of a failed order.

use thiserror::Error;

/// Streaming connection could not be established or was lost.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Handshake or TCP connect failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// An established connection failed while reading.
    #[error("connection dropped: {0}")]
    Dropped(String),

    /// Peer closed the stream.
    #[error("connection closed by peer")]
    Closed,
}

/// An inbound price payload could not be parsed into a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed price message: {reason}")]
pub struct MalformedMessageError {
    /// Human-readable parse failure.
    pub reason: String,
}

impl MalformedMessageError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MalformedMessageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// An order submission failed. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Request never produced an HTTP response.
    #[error("order request failed: {0}")]
    Transport(String),

    /// Backend answered with a non-success status.
    #[error("order rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Backend answered 2xx but the body was not a valid confirmation.
    #[error("malformed order response: {0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    /// The message shown to the user for any failed submission.
    pub const fn user_message(&self) -> &'static str {
        "Error placing trade"
    }
}

/// Fetching the trade ledger failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("trade query failed: {0}")]
    Transport(String),

    #[error("trade query returned status {0}")]
    Status(u16),

    #[error("malformed trade list: {0}")]
    Malformed(String),
}

/// User input could not be turned into an `OrderRequest`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderInputError {
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("quantity must be at least 1, got {0}")]
    QuantityTooSmall(f64),

    #[error("unknown side: {0}")]
    UnknownSide(String),

    /// Free-form order line did not have the expected shape.
    #[error("invalid order line: {0}")]
    Syntax(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_user_message_is_generic() {
        let errors = [
            SubmissionError::Transport("refused".to_string()),
            SubmissionError::Rejected {
                status: 400,
                body: "Invalid cryptocurrency symbol".to_string(),
            },
            SubmissionError::MalformedResponse("missing price".to_string()),
        ];
        for err in errors {
            assert_eq!(err.user_message(), "Error placing trade");
        }
    }

    #[test]
    fn test_malformed_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let malformed: MalformedMessageError = err.into();
        assert!(malformed.to_string().starts_with("malformed price message"));
    }
}

//! Core trading domain types.
//!
//! Orders as entered by the user, confirmations as reported by the
//! backend, and the ledger records returned by the trade query.
//! The backend is authoritative for everything except the order request
//! itself: confirmations and records are only ever built from responses.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::OrderInputError;

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Ticker symbol, e.g. "BTC".
pub type Symbol = String;

/// Backend-assigned trade identifier.
pub type TradeId = i64;

/// Symbols offered by the order form when nothing is configured.
pub const DEFAULT_SYMBOLS: [&str; 3] = ["BTC", "ETH", "ADA"];

/// Trade side. Lowercase on the wire (`"buy"` / `"sell"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = OrderInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(OrderInputError::UnknownSide(s.to_string())),
        }
    }
}

/// A user-specified order.
///
/// Construct through [`OrderRequest::new`] or [`OrderRequest::parse`];
/// both enforce `quantity >= 1` and a supported symbol. The submission
/// flow trusts these invariants and does not re-check them.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    symbol: Symbol,
    side: Side,
    quantity: f64,
}

impl OrderRequest {
    /// Validate user input into an order.
    pub fn new<S: AsRef<str>>(
        symbol: &str,
        side: Side,
        quantity: f64,
        supported: &[S],
    ) -> Result<Self, OrderInputError> {
        if !supported.iter().any(|s| s.as_ref() == symbol) {
            return Err(OrderInputError::UnsupportedSymbol(symbol.to_string()));
        }
        if !quantity.is_finite() || quantity < 1.0 {
            return Err(OrderInputError::QuantityTooSmall(quantity));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            side,
            quantity,
        })
    }

    /// Parse an order line of the form `"<side> <symbol> <quantity>"`,
    /// e.g. `"buy BTC 1"`. Symbols are matched case-insensitively.
    pub fn parse<S: AsRef<str>>(line: &str, supported: &[S]) -> Result<Self, OrderInputError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [side, symbol, quantity] = parts.as_slice() else {
            return Err(OrderInputError::Syntax(line.trim().to_string()));
        };

        let side: Side = side.parse()?;
        let symbol = symbol.to_ascii_uppercase();
        let quantity: f64 = quantity
            .parse()
            .map_err(|_| OrderInputError::Syntax(format!("bad quantity `{quantity}`")))?;

        Self::new(&symbol, side, quantity, supported)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn quantity(&self) -> f64 {
        self.quantity
    }
}

/// An executed trade as reported by the order-acceptance endpoint.
///
/// Every field comes from the backend response, never from the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeConfirmation {
    /// Present when the backend reports the stored trade id.
    pub id: Option<TradeId>,
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: f64,
    /// Execution price chosen by the backend.
    pub executed_price: f64,
    /// Present when the backend reports an execution timestamp.
    pub executed_at: Option<DateTime<Utc>>,
}

impl fmt::Display for TradeConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ ${}",
            self.symbol, self.side, self.quantity, self.executed_price
        )
    }
}

/// One row of the trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeId,
    pub symbol: Symbol,
    #[serde(rename = "type")]
    pub side: Side,
    #[serde(rename = "amount")]
    pub quantity: f64,
    pub price: f64,
    #[serde(
        rename = "datetime",
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub executed_at: Option<DateTime<Utc>>,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ ${}",
            self.symbol, self.side, self.quantity, self.price
        )
    }
}

/// Backend timestamps are informational. Anything that is not RFC 3339
/// becomes `None` instead of failing the whole record.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_accepts_supported_symbol() {
        let order = OrderRequest::new("BTC", Side::Buy, 1.0, &DEFAULT_SYMBOLS).unwrap();
        assert_eq!(order.symbol(), "BTC");
        assert_eq!(order.side(), Side::Buy);
        assert!((order.quantity() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_request_rejects_small_quantity() {
        let err = OrderRequest::new("ETH", Side::Sell, 0.5, &DEFAULT_SYMBOLS).unwrap_err();
        assert_eq!(err, OrderInputError::QuantityTooSmall(0.5));

        let err = OrderRequest::new("ETH", Side::Sell, f64::NAN, &DEFAULT_SYMBOLS);
        assert!(err.is_err());
    }

    #[test]
    fn test_order_request_rejects_unknown_symbol() {
        let err = OrderRequest::new("DOGE", Side::Buy, 3.0, &DEFAULT_SYMBOLS).unwrap_err();
        assert_eq!(err, OrderInputError::UnsupportedSymbol("DOGE".to_string()));
    }

    #[test]
    fn test_parse_order_line() {
        let order = OrderRequest::parse("  SELL ada 25 ", &DEFAULT_SYMBOLS).unwrap();
        assert_eq!(order.symbol(), "ADA");
        assert_eq!(order.side(), Side::Sell);
        assert!((order.quantity() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_order_line_errors() {
        assert!(matches!(
            OrderRequest::parse("buy BTC", &DEFAULT_SYMBOLS),
            Err(OrderInputError::Syntax(_))
        ));
        assert!(matches!(
            OrderRequest::parse("hold BTC 1", &DEFAULT_SYMBOLS),
            Err(OrderInputError::UnknownSide(_))
        ));
        assert!(matches!(
            OrderRequest::parse("buy BTC lots", &DEFAULT_SYMBOLS),
            Err(OrderInputError::Syntax(_))
        ));
    }

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        let side: Side = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(side, Side::Sell);
    }

    #[test]
    fn test_confirmation_display() {
        let confirmation = TradeConfirmation {
            id: None,
            symbol: "BTC".to_string(),
            side: Side::Buy,
            quantity: 1.0,
            executed_price: 61234.5,
            executed_at: None,
        };
        assert_eq!(confirmation.to_string(), "BTC buy 1 @ $61234.5");
    }

    #[test]
    fn test_trade_record_deserialization() {
        let json = r#"{"id": 7, "symbol": "ETH", "type": "sell", "amount": 2,
                       "price": 3021.1, "datetime": "2025-02-01T10:00:00Z"}"#;
        let record: TradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.side, Side::Sell);
        assert!(record.executed_at.is_some());

        let json = r#"{"id": 8, "symbol": "ADA", "type": "buy", "amount": 10, "price": 1.5}"#;
        let record: TradeRecord = serde_json::from_str(json).unwrap();
        assert!(record.executed_at.is_none());

        let json = r#"{"id": 9, "symbol": "BTC", "type": "buy", "amount": 1,
                       "price": 50000, "datetime": "2025-02-01 10:00:00"}"#;
        let record: TradeRecord = serde_json::from_str(json).unwrap();
        assert!(record.executed_at.is_none());
    }
}

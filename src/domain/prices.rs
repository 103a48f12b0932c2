//! Price snapshot - the complete symbol → price mapping.
//!
//! Each inbound feed message is a full snapshot. A new snapshot replaces
//! the previous one wholesale; nothing is merged.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::trade::Symbol;
use crate::error::MalformedMessageError;

/// Latest known price for every symbol the feed reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSnapshot {
    prices: BTreeMap<Symbol, f64>,
}

impl PriceSnapshot {
    /// Parse a feed payload such as `{"BTC": 61234.5, "ETH": 3021.1}`.
    ///
    /// The payload must be a JSON object whose values are all numbers.
    /// Any structural violation rejects the whole message. Values are
    /// taken as reported, including negative ones.
    pub fn parse(text: &str) -> Result<Self, MalformedMessageError> {
        let value: Value = serde_json::from_str(text)?;

        let Value::Object(map) = value else {
            return Err(MalformedMessageError::new("expected a JSON object"));
        };

        let mut prices = BTreeMap::new();
        for (symbol, raw) in map {
            let price = raw.as_f64().ok_or_else(|| {
                MalformedMessageError::new(format!("price for {symbol} is not a number"))
            })?;
            prices.insert(symbol, price);
        }

        Ok(Self { prices })
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Iterate prices in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(s, p)| (s.as_str(), *p))
    }

    /// Ticker lines, e.g. `"BTC: $61234.50"`.
    pub fn ticker_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(symbol, price)| format!("{symbol}: ${price:.2}"))
            .collect()
    }
}

impl FromIterator<(Symbol, f64)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

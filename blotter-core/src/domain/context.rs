use crate::domain::order::Order;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument reference carried by an `fdc3.instrument` context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentId {
    pub ticker: String,
}

/// A context payload published on the bus.
///
/// Exactly two wire envelopes exist: `finsemble.order` carrying a full
/// order, and `fdc3.instrument` carrying an instrument reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Context {
    #[serde(rename = "finsemble.order")]
    Order { order: Order },
    #[serde(rename = "fdc3.instrument")]
    Instrument { id: InstrumentId },
}

impl Context {
    pub fn order(order: Order) -> Self {
        Context::Order { order }
    }

    pub fn instrument(ticker: impl Into<String>) -> Self {
        Context::Instrument {
            id: InstrumentId { ticker: ticker.into() },
        }
    }

    pub fn context_type(&self) -> ContextType {
        match self {
            Context::Order { .. } => ContextType::Order,
            Context::Instrument { .. } => ContextType::Instrument,
        }
    }
}

/// Context type tag used to filter listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    Order,
    Instrument,
}

impl ContextType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextType::Order => "finsemble.order",
            ContextType::Instrument => "fdc3.instrument",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_order;

    #[test]
    fn order_envelope_shape() {
        let ctx = Context::order(test_order(2001, "MSFT"));
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["type"], "finsemble.order");
        assert_eq!(value["order"]["orderId"], 2001);
        assert_eq!(value["order"]["ticker"], "MSFT");
    }

    #[test]
    fn instrument_envelope_shape() {
        let ctx = Context::instrument("AAPL");
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["type"], "fdc3.instrument");
        assert_eq!(value["id"]["ticker"], "AAPL");
    }

    #[test]
    fn envelope_round_trip() {
        let ctx = Context::order(test_order(3003, "TSLA"));
        let json = serde_json::to_string(&ctx).unwrap();
        let back: Context = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
        assert_eq!(back.context_type(), ContextType::Order);
    }
}

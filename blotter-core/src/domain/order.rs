use crate::domain::ids::{AppName, OrderId, SecurityId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
///
/// NEW on creation, READY when staged for execution by another app, WORKING
/// while the fill simulator is advancing it, FILLED on the terminal
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Ready,
    Working,
    Filled,
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Ready => "READY",
            OrderStatus::Working => "WORKING",
            OrderStatus::Filled => "FILLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Executing broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Broker {
    Cs,
    Jpm,
    Citi,
    Ms,
    Barc,
}

impl Broker {
    pub const ALL: [Broker; 5] = [Broker::Cs, Broker::Jpm, Broker::Citi, Broker::Ms, Broker::Barc];

    pub fn label(self) -> &'static str {
        match self {
            Broker::Cs => "CS",
            Broker::Jpm => "JPM",
            Broker::Citi => "CITI",
            Broker::Ms => "MS",
            Broker::Barc => "BARC",
        }
    }
}

/// Security type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityType {
    /// Corporate bond
    Cb,
    /// Government bond
    Gb,
    /// Common stock
    Com,
    /// Preferred stock
    Pfd,
}

impl SecurityType {
    pub const ALL: [SecurityType; 4] = [
        SecurityType::Cb,
        SecurityType::Gb,
        SecurityType::Com,
        SecurityType::Pfd,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SecurityType::Cb => "CB",
            SecurityType::Gb => "GB",
            SecurityType::Com => "COM",
            SecurityType::Pfd => "PFD",
        }
    }
}

/// Buy/sell side of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Buy long
    Buyl,
    Sell,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Buyl, TransactionType::Sell];

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Buyl => "BUYL",
            TransactionType::Sell => "SELL",
        }
    }
}

/// How long the order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDuration {
    /// Day order
    #[serde(rename = "D")]
    Day,
    /// Good till cancelled
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    /// Good till date
    #[serde(rename = "GTD")]
    GoodTillDate,
    /// Fill or kill
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl OrderDuration {
    pub const ALL: [OrderDuration; 4] = [
        OrderDuration::Day,
        OrderDuration::GoodTillCancelled,
        OrderDuration::GoodTillDate,
        OrderDuration::FillOrKill,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderDuration::Day => "D",
            OrderDuration::GoodTillCancelled => "GTC",
            OrderDuration::GoodTillDate => "GTD",
            OrderDuration::FillOrKill => "FOK",
        }
    }
}

/// Handling instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LIM")]
    Limit,
    #[serde(rename = "MO")]
    MarketOpen,
}

impl Instruction {
    pub const ALL: [Instruction; 3] =
        [Instruction::Market, Instruction::Limit, Instruction::MarketOpen];

    pub fn label(self) -> &'static str {
        match self {
            Instruction::Market => "MKT",
            Instruction::Limit => "LIM",
            Instruction::MarketOpen => "MO",
        }
    }
}

/// A trade instruction record exchanged between applications.
///
/// Serializes with camelCase field names — the wire shape shared by every
/// app on the context bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub security_id: SecurityId,
    pub ticker: String,
    pub manager: String,
    pub trader: String,
    pub account: String,
    pub broker: Broker,
    pub security_type: SecurityType,
    pub transaction_type: TransactionType,
    pub duration: OrderDuration,
    pub instruction: Instruction,
    pub target_price: f64,
    pub target_quantity: u32,
    /// target_price × target_quantity, computed once at creation and never
    /// recomputed.
    pub target_amount: f64,
    pub trade_date: NaiveDate,
    /// trade_date + 2 calendar days, derived at creation.
    pub settlement_date: NaiveDate,
    pub status: OrderStatus,
    pub executed_quantity: u32,
    /// Originating application.
    pub app_name: AppName,
    /// Intended recipient, set when the order is sent across the bus.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination_app: Option<AppName>,
}

impl Order {
    pub fn remaining_quantity(&self) -> u32 {
        self.target_quantity.saturating_sub(self.executed_quantity)
    }

    pub fn is_filled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Executed fraction in [0, 1] for progress display.
    pub fn fill_fraction(&self) -> f64 {
        if self.target_quantity == 0 {
            return 1.0;
        }
        f64::from(self.executed_quantity) / f64::from(self.target_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_order;

    #[test]
    fn status_wire_labels() {
        for status in [
            OrderStatus::New,
            OrderStatus::Ready,
            OrderStatus::Working,
            OrderStatus::Filled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }

    #[test]
    fn enum_wire_labels() {
        assert_eq!(serde_json::to_string(&Broker::Jpm).unwrap(), "\"JPM\"");
        assert_eq!(serde_json::to_string(&SecurityType::Pfd).unwrap(), "\"PFD\"");
        assert_eq!(serde_json::to_string(&TransactionType::Buyl).unwrap(), "\"BUYL\"");
        assert_eq!(
            serde_json::to_string(&OrderDuration::GoodTillCancelled).unwrap(),
            "\"GTC\""
        );
        assert_eq!(serde_json::to_string(&Instruction::MarketOpen).unwrap(), "\"MO\"");
    }

    #[test]
    fn order_serializes_camel_case() {
        let order = test_order(1234, "AAPL");
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["orderId"], 1234);
        assert_eq!(value["targetQuantity"], 200);
        assert_eq!(value["executedQuantity"], 0);
        assert_eq!(value["appName"], "desk");
        // destination_app is absent until the order is sent somewhere
        assert!(value.get("destinationApp").is_none());
    }

    #[test]
    fn remaining_and_fraction() {
        let mut order = test_order(1, "AAPL");
        assert_eq!(order.remaining_quantity(), 200);
        order.executed_quantity = 150;
        assert_eq!(order.remaining_quantity(), 50);
        assert!((order.fill_fraction() - 0.75).abs() < f64::EPSILON);
    }
}

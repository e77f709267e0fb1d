//! Domain types — orders, ids, and the bus wire envelopes.

pub mod context;
pub mod ids;
pub mod order;

pub use context::{Context, ContextType, InstrumentId};
pub use ids::{AppName, OrderId, SecurityId};
pub use order::{
    Broker, Instruction, Order, OrderDuration, OrderStatus, SecurityType, TransactionType,
};

/// Build a representative order for unit tests.
#[cfg(test)]
pub(crate) fn test_order(id: u32, ticker: &str) -> Order {
    use chrono::NaiveDate;

    Order {
        order_id: OrderId(id),
        security_id: SecurityId(id + 1),
        ticker: ticker.to_string(),
        manager: "Dave".to_string(),
        trader: "Dave".to_string(),
        account: "PF76876".to_string(),
        broker: Broker::Cs,
        security_type: SecurityType::Cb,
        transaction_type: TransactionType::Buyl,
        duration: OrderDuration::Day,
        instruction: Instruction::Market,
        target_price: 42.0,
        target_quantity: 200,
        target_amount: 8400.0,
        trade_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        settlement_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
        status: OrderStatus::New,
        executed_quantity: 0,
        app_name: AppName::new("desk"),
        destination_app: None,
    }
}

//! Order entry — validated drafts and submission stamping.
//!
//! The entry form collects the user-editable order fields; submission
//! stamps fresh random ids, derives the settlement date and notional
//! amount, and hands a NEW order to the caller. Validation failures are
//! field-level and block submission; they never reach the store.

use crate::domain::{
    AppName, Broker, Instruction, Order, OrderDuration, OrderId, OrderStatus, SecurityId,
    SecurityType, TransactionType,
};
use crate::store::OrderStore;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Calendar days between trade date and settlement.
pub const SETTLEMENT_LAG_DAYS: i64 = 2;

/// Form field, for field-level validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Ticker,
    Manager,
    Trader,
    Account,
    TargetPrice,
    TargetQuantity,
}

impl DraftField {
    pub fn label(self) -> &'static str {
        match self {
            DraftField::Ticker => "ticker",
            DraftField::Manager => "manager",
            DraftField::Trader => "trader",
            DraftField::Account => "account",
            DraftField::TargetPrice => "target price",
            DraftField::TargetQuantity => "target quantity",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} is required")]
    Required(DraftField),

    #[error("{0} must be positive")]
    NotPositive(DraftField),
}

impl DraftError {
    pub fn field(&self) -> DraftField {
        match self {
            DraftError::Required(field) | DraftError::NotPositive(field) => *field,
        }
    }
}

/// User-editable order fields, before ids and derived values are stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
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
    pub trade_date: NaiveDate,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            ticker: "AAPL".to_string(),
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
            trade_date: chrono::Local::now().date_naive(),
        }
    }
}

impl OrderDraft {
    /// Field-level validation. Collects every failure so the form can show
    /// them all at once.
    pub fn validate(&self) -> Result<(), Vec<DraftError>> {
        let mut errors = Vec::new();

        for (value, field) in [
            (&self.ticker, DraftField::Ticker),
            (&self.manager, DraftField::Manager),
            (&self.trader, DraftField::Trader),
            (&self.account, DraftField::Account),
        ] {
            if value.trim().is_empty() {
                errors.push(DraftError::Required(field));
            }
        }

        if !(self.target_price > 0.0) {
            errors.push(DraftError::NotPositive(DraftField::TargetPrice));
        }
        if self.target_quantity == 0 {
            errors.push(DraftError::NotPositive(DraftField::TargetQuantity));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate and stamp the draft into a NEW order for `app_name`.
    ///
    /// Ids are drawn from [1000, 5000], re-rolled against the orders the
    /// store currently holds. The notional amount and settlement date are
    /// computed here, once.
    pub fn into_order(self, app_name: AppName, store: &OrderStore) -> Result<Order, Vec<DraftError>> {
        self.validate()?;

        let mut rng = rand::thread_rng();
        Ok(Order {
            order_id: random_order_id(store, &mut rng),
            security_id: SecurityId(rng.gen_range(OrderId::MIN..=OrderId::MAX)),
            target_amount: self.target_price * f64::from(self.target_quantity),
            settlement_date: settlement_date(self.trade_date),
            status: OrderStatus::New,
            executed_quantity: 0,
            app_name,
            destination_app: None,
            ticker: self.ticker,
            manager: self.manager,
            trader: self.trader,
            account: self.account,
            broker: self.broker,
            security_type: self.security_type,
            transaction_type: self.transaction_type,
            duration: self.duration,
            instruction: self.instruction,
            target_price: self.target_price,
            target_quantity: self.target_quantity,
            trade_date: self.trade_date,
        })
    }
}

/// Trade date + 2 calendar days.
pub fn settlement_date(trade_date: NaiveDate) -> NaiveDate {
    trade_date + chrono::Duration::days(SETTLEMENT_LAG_DAYS)
}

/// Draw an order id not currently held by the store. Collisions against
/// removed orders are possible; only the live set is checked.
fn random_order_id(store: &OrderStore, rng: &mut impl Rng) -> OrderId {
    loop {
        let id = OrderId(rng.gen_range(OrderId::MIN..=OrderId::MAX));
        if !store.contains(id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_canonical_demo_order() {
        let draft = OrderDraft::default();
        assert_eq!(draft.ticker, "AAPL");
        assert_eq!(draft.target_price, 42.0);
        assert_eq!(draft.target_quantity, 200);
        assert_eq!(draft.broker, Broker::Cs);
        assert_eq!(draft.instruction, Instruction::Market);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn stamped_order_derives_amount_settlement_and_status() {
        let draft = OrderDraft {
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            ..OrderDraft::default()
        };

        let store = OrderStore::new();
        let order = draft.into_order(AppName::new("desk"), &store).unwrap();

        assert_eq!(order.target_amount, 8400.0);
        assert_eq!(
            order.settlement_date,
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
        );
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.executed_quantity, 0);
        assert!((OrderId::MIN..=OrderId::MAX).contains(&order.order_id.0));
        assert!((OrderId::MIN..=OrderId::MAX).contains(&order.security_id.0));
        assert_eq!(order.app_name.as_str(), "desk");
        assert!(order.destination_app.is_none());
    }

    #[test]
    fn settlement_crosses_month_and_year_boundaries() {
        assert_eq!(
            settlement_date(NaiveDate::from_ymd_opt(2024, 1, 30).unwrap()),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert_eq!(
            settlement_date(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn validation_collects_every_failure() {
        let draft = OrderDraft {
            ticker: String::new(),
            manager: "  ".to_string(),
            target_price: 0.0,
            target_quantity: 0,
            ..OrderDraft::default()
        };

        let errors = draft.validate().unwrap_err();
        let fields: Vec<DraftField> = errors.iter().map(DraftError::field).collect();
        assert_eq!(
            fields,
            vec![
                DraftField::Ticker,
                DraftField::Manager,
                DraftField::TargetPrice,
                DraftField::TargetQuantity,
            ]
        );
    }

    #[test]
    fn invalid_draft_never_becomes_an_order() {
        let draft = OrderDraft {
            ticker: String::new(),
            ..OrderDraft::default()
        };
        let store = OrderStore::new();
        assert!(draft.into_order(AppName::new("desk"), &store).is_err());
    }

    #[test]
    fn repeated_submissions_yield_distinct_ids() {
        let mut store = OrderStore::new();
        for _ in 0..50 {
            let order = OrderDraft::default()
                .into_order(AppName::new("desk"), &store)
                .unwrap();
            // add() would reject a duplicate id, so 50 clean inserts prove
            // the re-roll against the live set.
            store.add(order).unwrap();
        }
        assert_eq!(store.len(), 50);
    }
}

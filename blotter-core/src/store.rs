//! Order store — the working set of orders for one application instance.
//!
//! Every mutation installs a fresh snapshot (`Arc<Vec<Order>>`), so a reader
//! holding a snapshot never observes a half-applied transition. Lookup
//! misses are explicit errors rather than silent no-ops; callers decide
//! whether to surface or downgrade them.

use crate::domain::{Order, OrderId, OrderStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("order {0} already exists")]
    Duplicate(OrderId),

    #[error("order {0} not found")]
    NotFound(OrderId),
}

/// Partial update applied to a single order by the fill simulator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillPatch {
    pub executed_quantity: Option<u32>,
    pub status: Option<OrderStatus>,
}

impl FillPatch {
    /// An in-flight increment: quantity advances, status becomes WORKING.
    pub fn progress(executed_quantity: u32) -> Self {
        Self {
            executed_quantity: Some(executed_quantity),
            status: Some(OrderStatus::Working),
        }
    }

    /// The terminal transition: quantity lands on the target, status FILLED.
    pub fn filled(executed_quantity: u32) -> Self {
        Self {
            executed_quantity: Some(executed_quantity),
            status: Some(OrderStatus::Filled),
        }
    }
}

/// Ordered collection of orders, most recent first.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: Arc<Vec<Order>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front. The newest order is always row zero.
    pub fn add(&mut self, order: Order) -> Result<(), StoreError> {
        if self.contains(order.order_id) {
            return Err(StoreError::Duplicate(order.order_id));
        }
        debug!(order_id = %order.order_id, ticker = %order.ticker, "store add");
        Arc::make_mut(&mut self.orders).insert(0, order);
        Ok(())
    }

    /// Replace the order with the matching id, preserving its position.
    pub fn update(&mut self, order: Order) -> Result<(), StoreError> {
        let id = order.order_id;
        let orders = Arc::make_mut(&mut self.orders);
        let slot = orders
            .iter_mut()
            .find(|o| o.order_id == id)
            .ok_or(StoreError::NotFound(id))?;
        debug!(order_id = %id, "store update");
        *slot = order;
        Ok(())
    }

    /// Remove the order with the matching id. The index is resolved in the
    /// same critical section as the removal, so no caller-side race exists.
    pub fn remove(&mut self, id: OrderId) -> Result<Order, StoreError> {
        let orders = Arc::make_mut(&mut self.orders);
        let index = orders
            .iter()
            .position(|o| o.order_id == id)
            .ok_or(StoreError::NotFound(id))?;
        debug!(order_id = %id, "store remove");
        Ok(orders.remove(index))
    }

    /// Merge a fill patch into the order with the matching id.
    pub fn apply_fill(&mut self, id: OrderId, patch: FillPatch) -> Result<(), StoreError> {
        let orders = Arc::make_mut(&mut self.orders);
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(executed) = patch.executed_quantity {
            order.executed_quantity = executed;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        debug!(
            order_id = %id,
            executed = order.executed_quantity,
            status = %order.status,
            "store fill"
        );
        Ok(())
    }

    /// Current snapshot. Cheap to clone; stays stable while the store moves on.
    pub fn snapshot(&self) -> Arc<Vec<Order>> {
        Arc::clone(&self.orders)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.iter().any(|o| o.order_id == id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

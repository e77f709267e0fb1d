//! Application session — one app's identity, store, bus listeners, and
//! fill simulator, owned together.
//!
//! Inbound routing: payloads this app published are skipped; payloads
//! addressed elsewhere are skipped; a READY payload updates the existing
//! copy; anything else is forced to NEW and added, deduplicated by id.

use crate::bus::{ContextBus, Subscription};
use crate::domain::{AppName, Context, ContextType, Order, OrderId, OrderStatus};
use crate::entry::{DraftError, OrderDraft};
use crate::fill::{FillError, FillEvent, FillSimulator};
use crate::store::{FillPatch, OrderStore, StoreError};
use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Fill simulator tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSettings {
    /// Delay between increments.
    pub tick: Duration,
    /// Per-step fraction of the target quantity.
    pub fraction: f64,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(2),
            fraction: 0.25,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fill(#[from] FillError),

    #[error("draft rejected: {} field error(s)", .0.len())]
    Draft(Vec<DraftError>),
}

/// Something the owning view should know about, produced by [`Session::pump`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An order from another app landed in this store.
    OrderArrived {
        order_id: OrderId,
        ticker: String,
        from: AppName,
        target_amount: f64,
    },
    /// An inbound READY payload replaced an existing order.
    OrderUpdated { order_id: OrderId },
    /// A fill increment was applied locally.
    FillProgress {
        order_id: OrderId,
        executed_quantity: u32,
        target_quantity: u32,
    },
    /// An order reached its terminal state.
    OrderFilled { order_id: OrderId },
    /// Another app put an instrument in focus.
    InstrumentSignal { ticker: String },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::OrderArrived {
                ticker,
                from,
                target_amount,
                ..
            } => write!(f, "New order from {from}: {ticker} at {target_amount}"),
            SessionEvent::OrderUpdated { order_id } => write!(f, "Order {order_id} updated"),
            SessionEvent::FillProgress {
                order_id,
                executed_quantity,
                target_quantity,
            } => write!(f, "Order {order_id} executed {executed_quantity}/{target_quantity}"),
            SessionEvent::OrderFilled { order_id } => write!(f, "Order {order_id} filled"),
            SessionEvent::InstrumentSignal { ticker } => write!(f, "Instrument in focus: {ticker}"),
        }
    }
}

/// One application instance on the bus.
pub struct Session {
    app_name: AppName,
    store: OrderStore,
    bus: Arc<dyn ContextBus>,
    simulator: FillSimulator,
    fill_rx: Receiver<FillEvent>,
    order_rx: Receiver<Context>,
    instrument_rx: Receiver<Context>,
    _order_sub: Subscription,
    _instrument_sub: Subscription,
}

impl Session {
    /// Join the bus under `app_name` with an empty store.
    pub fn connect(app_name: AppName, bus: Arc<dyn ContextBus>, fill: FillSettings) -> Self {
        let (order_sub, order_rx) = bus.add_context_listener(ContextType::Order);
        let (instrument_sub, instrument_rx) = bus.add_context_listener(ContextType::Instrument);
        let (fill_tx, fill_rx) = mpsc::channel();
        let simulator = FillSimulator::new(fill.tick, fill.fraction, Arc::clone(&bus), fill_tx);

        debug!(app = %app_name, "session connected");
        Self {
            app_name,
            store: OrderStore::new(),
            bus,
            simulator,
            fill_rx,
            order_rx,
            instrument_rx,
            _order_sub: order_sub,
            _instrument_sub: instrument_sub,
        }
    }

    pub fn app_name(&self) -> &AppName {
        &self.app_name
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Validate and add a new order drafted in this app.
    pub fn submit(&mut self, draft: OrderDraft) -> Result<OrderId, SessionError> {
        let order = draft
            .into_order(self.app_name.clone(), &self.store)
            .map_err(SessionError::Draft)?;
        let order_id = order.order_id;
        self.store.add(order)?;
        Ok(order_id)
    }

    /// Re-tag a copy of the order for `destination` and broadcast it.
    /// The local copy is left untouched.
    pub fn send_to(&self, id: OrderId, destination: &AppName) -> Result<(), SessionError> {
        let mut order = self
            .store
            .get(id)
            .ok_or(StoreError::NotFound(id))?
            .clone();
        order.destination_app = Some(destination.clone());
        debug!(order_id = %id, %destination, "send order");
        self.bus.broadcast(Context::order(order));
        Ok(())
    }

    /// Start the fill simulator for a held order.
    pub fn execute(&self, id: OrderId) -> Result<(), SessionError> {
        let order = self.store.get(id).ok_or(StoreError::NotFound(id))?;
        self.simulator.execute(order)?;
        Ok(())
    }

    /// Remove a held order.
    pub fn remove(&mut self, id: OrderId) -> Result<Order, SessionError> {
        Ok(self.store.remove(id)?)
    }

    /// Put an instrument in focus for every listening app.
    pub fn broadcast_instrument(&self, ticker: &str) {
        self.bus.broadcast(Context::instrument(ticker));
    }

    pub fn is_executing(&self, id: OrderId) -> bool {
        self.simulator.is_running(id)
    }

    /// Drain fill events and inbound contexts, apply them to the store, and
    /// report what happened. Call once per event-loop iteration.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Ok(fill) = self.fill_rx.try_recv() {
            events.extend(self.apply_fill_event(fill));
        }

        // try_iter would hold the receiver borrowed across the mutation;
        // collect first.
        let inbound: Vec<Context> = self.order_rx.try_iter().collect();
        for context in inbound {
            if let Context::Order { order } = context {
                events.extend(self.route_inbound(order));
            }
        }

        while let Ok(context) = self.instrument_rx.try_recv() {
            if let Context::Instrument { id } = context {
                trace!(app = %self.app_name, ticker = %id.ticker, "instrument signal");
                events.push(SessionEvent::InstrumentSignal { ticker: id.ticker });
            }
        }

        events
    }

    /// Disconnect: stop fill chains, release listeners.
    pub fn shutdown(self) {
        debug!(app = %self.app_name, "session shutdown");
        self.simulator.shutdown();
        // Subscriptions release on drop.
    }

    fn apply_fill_event(&mut self, fill: FillEvent) -> Option<SessionEvent> {
        let order_id = fill.order.order_id;
        let patch = if fill.terminal {
            FillPatch::filled(fill.order.executed_quantity)
        } else {
            FillPatch::progress(fill.order.executed_quantity)
        };

        match self.store.apply_fill(order_id, patch) {
            Ok(()) => Some(if fill.terminal {
                SessionEvent::OrderFilled { order_id }
            } else {
                SessionEvent::FillProgress {
                    order_id,
                    executed_quantity: fill.order.executed_quantity,
                    target_quantity: fill.order.target_quantity,
                }
            }),
            Err(StoreError::NotFound(_)) => {
                // Removed while its simulation was still running.
                warn!(app = %self.app_name, order_id = %order_id, "fill for unknown order dropped");
                None
            }
            Err(err) => {
                warn!(app = %self.app_name, order_id = %order_id, %err, "fill not applied");
                None
            }
        }
    }

    fn route_inbound(&mut self, order: Order) -> Option<SessionEvent> {
        if order.app_name == self.app_name {
            trace!(app = %self.app_name, order_id = %order.order_id, "self-published, skipped");
            return None;
        }
        if order.destination_app.as_ref() != Some(&self.app_name) {
            trace!(app = %self.app_name, order_id = %order.order_id, "not addressed here, skipped");
            return None;
        }

        let order_id = order.order_id;
        if order.status == OrderStatus::Ready {
            match self.store.update(order) {
                Ok(()) => Some(SessionEvent::OrderUpdated { order_id }),
                Err(err) => {
                    warn!(app = %self.app_name, order_id = %order_id, %err, "READY update dropped");
                    None
                }
            }
        } else {
            let mut order = order;
            let from = order.app_name.clone();
            let ticker = order.ticker.clone();
            let target_amount = order.target_amount;
            order.status = OrderStatus::New;
            match self.store.add(order) {
                Ok(()) => Some(SessionEvent::OrderArrived {
                    order_id,
                    ticker,
                    from,
                    target_amount,
                }),
                Err(err) => {
                    debug!(app = %self.app_name, order_id = %order_id, %err, "inbound add dropped");
                    None
                }
            }
        }
    }
}

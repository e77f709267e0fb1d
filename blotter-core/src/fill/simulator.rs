//! Timed fill driver — advances orders toward their target on a background
//! thread, one tick per increment.
//!
//! Two guards hold throughout: at most one in-flight simulation per order
//! id, and a disposal flag tied to the simulator's owner so no orphaned
//! timer chain mutates a store after teardown.

use crate::bus::ContextBus;
use crate::domain::{Context, Order, OrderId, OrderStatus};
use crate::fill::plan::FillPlan;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("order {0} already has a fill simulation in flight")]
    AlreadyRunning(OrderId),

    #[error("order {0} is already filled")]
    AlreadyFilled(OrderId),
}

/// One increment as observed by the owning session.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub order: Order,
    pub terminal: bool,
}

/// Drives fill simulations for one application instance.
///
/// On every increment the patched order is published to the bus first, then
/// delivered to the owner through the event channel; the owner applies it
/// to its local store.
pub struct FillSimulator {
    tick: Duration,
    fraction: f64,
    bus: Arc<dyn ContextBus>,
    events_tx: Sender<FillEvent>,
    in_flight: Arc<Mutex<HashSet<OrderId>>>,
    disposed: Arc<AtomicBool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl FillSimulator {
    pub fn new(
        tick: Duration,
        fraction: f64,
        bus: Arc<dyn ContextBus>,
        events_tx: Sender<FillEvent>,
    ) -> Self {
        Self {
            tick,
            fraction,
            bus,
            events_tx,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            disposed: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Start a simulation for the given order.
    ///
    /// Refused if the order is already filled or a simulation for the same
    /// id is in flight.
    pub fn execute(&self, order: &Order) -> Result<(), FillError> {
        if order.status == OrderStatus::Filled {
            return Err(FillError::AlreadyFilled(order.order_id));
        }

        {
            let mut in_flight = self.in_flight.lock().expect("fill registry poisoned");
            if !in_flight.insert(order.order_id) {
                return Err(FillError::AlreadyRunning(order.order_id));
            }
        }

        debug!(order_id = %order.order_id, target = order.target_quantity, "fill start");

        let tick = self.tick;
        let mut plan = FillPlan::with_fraction(order.target_quantity, self.fraction);
        let mut order = order.clone();
        let bus = Arc::clone(&self.bus);
        let events_tx = self.events_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let disposed = Arc::clone(&self.disposed);

        let handle = thread::Builder::new()
            .name(format!("fill-{}", order.order_id))
            .spawn(move || {
                loop {
                    if sleep_unless_disposed(tick, &disposed) {
                        trace!(order_id = %order.order_id, "fill disposed mid-flight");
                        break;
                    }

                    let step = plan.advance();
                    order.executed_quantity = step.executed_quantity;
                    order.status = if step.terminal {
                        OrderStatus::Filled
                    } else {
                        OrderStatus::Working
                    };

                    // Publish before the local store sees it, so observers
                    // on the bus track live progress.
                    bus.broadcast(Context::order(order.clone()));
                    let delivered = events_tx
                        .send(FillEvent {
                            order: order.clone(),
                            terminal: step.terminal,
                        })
                        .is_ok();
                    trace!(
                        order_id = %order.order_id,
                        executed = step.executed_quantity,
                        terminal = step.terminal,
                        "fill increment"
                    );

                    if step.terminal || !delivered {
                        break;
                    }
                }

                in_flight
                    .lock()
                    .expect("fill registry poisoned")
                    .remove(&order.order_id);
            })
            .expect("failed to spawn fill thread");

        self.handles.lock().expect("fill handles poisoned").push(handle);
        Ok(())
    }

    pub fn is_running(&self, id: OrderId) -> bool {
        self.in_flight
            .lock()
            .expect("fill registry poisoned")
            .contains(&id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().expect("fill registry poisoned").len()
    }

    /// Stop every timer chain and join the driver threads.
    pub fn shutdown(&self) {
        self.disposed.store(true, Ordering::Relaxed);
        let handles: Vec<JoinHandle<()>> =
            self.handles.lock().expect("fill handles poisoned").drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for FillSimulator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep for `duration`, waking early if the disposal flag is set.
/// Returns true when disposed.
fn sleep_unless_disposed(duration: Duration, disposed: &AtomicBool) -> bool {
    const SLICE: Duration = Duration::from_millis(25);
    let deadline = Instant::now() + duration;
    loop {
        if disposed.load(Ordering::Relaxed) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(SLICE.min(deadline - now));
    }
}

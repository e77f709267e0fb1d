//! In-process bus — the opaque interop transport, reduced to a listener
//! registry behind a mutex.

use crate::bus::{ContextBus, Subscription};
use crate::domain::{Context, ContextType};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

struct ListenerEntry {
    id: u64,
    context_type: ContextType,
    tx: Sender<Context>,
}

type Registry = Mutex<HashMap<Option<String>, Vec<ListenerEntry>>>;

/// Shared in-process transport. All application instances in one process
/// hold the same `Arc<InProcessBus>`.
#[derive(Default)]
pub struct InProcessBus {
    registry: Arc<Registry>,
    next_listener_id: AtomicU64,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live listeners on a channel, for tests and diagnostics.
    pub fn listener_count(&self, channel: Option<&str>) -> usize {
        let registry = self.registry.lock().expect("bus registry poisoned");
        registry
            .get(&channel.map(String::from))
            .map_or(0, Vec::len)
    }
}

impl ContextBus for InProcessBus {
    fn broadcast_scoped(&self, channel: Option<&str>, context: Context) {
        let key = channel.map(String::from);
        let context_type = context.context_type();
        let mut registry = self.registry.lock().expect("bus registry poisoned");
        let Some(listeners) = registry.get_mut(&key) else {
            trace!(%context_type, channel = channel.unwrap_or("<app>"), "broadcast with no listeners");
            return;
        };
        // A failed send means the receiver is gone; drop the entry.
        listeners.retain(|listener| {
            if listener.context_type != context_type {
                return true;
            }
            listener.tx.send(context.clone()).is_ok()
        });
        trace!(%context_type, channel = channel.unwrap_or("<app>"), "broadcast");
    }

    fn listen_scoped(
        &self,
        channel: Option<&str>,
        context_type: ContextType,
    ) -> (Subscription, Receiver<Context>) {
        let key = channel.map(String::from);
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();

        {
            let mut registry = self.registry.lock().expect("bus registry poisoned");
            registry.entry(key.clone()).or_default().push(ListenerEntry {
                id,
                context_type,
                tx,
            });
        }

        let registry = Arc::clone(&self.registry);
        let subscription = Subscription::new(move || {
            let mut registry = registry.lock().expect("bus registry poisoned");
            if let Some(listeners) = registry.get_mut(&key) {
                listeners.retain(|listener| listener.id != id);
            }
        });

        (subscription, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::get_or_create_channel;
    use crate::domain::test_order;

    fn bus() -> Arc<InProcessBus> {
        Arc::new(InProcessBus::new())
    }

    #[test]
    fn listener_receives_matching_broadcasts() {
        let bus = bus();
        let (_sub, rx) = bus.add_context_listener(ContextType::Order);

        bus.broadcast(Context::order(test_order(1001, "AAPL")));
        bus.broadcast(Context::instrument("MSFT"));

        let got = rx.try_recv().unwrap();
        assert_eq!(got.context_type(), ContextType::Order);
        // The instrument context was filtered by type.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_every_listener_including_the_publisher() {
        let bus = bus();
        let (_sub_a, rx_a) = bus.add_context_listener(ContextType::Order);
        let (_sub_b, rx_b) = bus.add_context_listener(ContextType::Order);

        bus.broadcast(Context::order(test_order(1001, "AAPL")));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn broadcast_with_no_listener_is_lost() {
        let bus = bus();
        bus.broadcast(Context::order(test_order(1001, "AAPL")));

        // Subscribing after the fact yields nothing.
        let (_sub, rx) = bus.add_context_listener(ContextType::Order);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = bus();
        let (sub, rx) = bus.add_context_listener(ContextType::Order);
        assert_eq!(bus.listener_count(None), 1);

        sub.unsubscribe();
        assert_eq!(bus.listener_count(None), 0);

        bus.broadcast(Context::order(test_order(1001, "AAPL")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_the_subscription_also_releases_the_listener() {
        let bus = bus();
        {
            let (_sub, _rx) = bus.add_context_listener(ContextType::Order);
            assert_eq!(bus.listener_count(None), 1);
        }
        assert_eq!(bus.listener_count(None), 0);
    }

    #[test]
    fn named_channels_are_isolated() {
        let bus = bus();
        let shared: Arc<dyn ContextBus> = bus.clone();
        let red = get_or_create_channel(&shared, "red");
        let blue = get_or_create_channel(&shared, "blue");

        let (_sub_red, rx_red) = red.add_context_listener(ContextType::Order);
        let (_sub_blue, rx_blue) = blue.add_context_listener(ContextType::Order);
        let (_sub_app, rx_app) = shared.add_context_listener(ContextType::Order);

        red.broadcast(Context::order(test_order(1001, "AAPL")));

        assert!(rx_red.try_recv().is_ok());
        assert!(rx_blue.try_recv().is_err());
        assert!(rx_app.try_recv().is_err());
    }

    #[test]
    fn dead_receiver_is_pruned_on_next_broadcast() {
        let bus = bus();
        let (sub, rx) = bus.add_context_listener(ContextType::Order);
        drop(rx);

        bus.broadcast(Context::order(test_order(1001, "AAPL")));
        assert_eq!(bus.listener_count(None), 0);
        drop(sub);
    }
}

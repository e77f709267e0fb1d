//! Cross-app context bus.
//!
//! The transport contract is deliberately relaxed: fire-and-forget publish,
//! asynchronous delivery, at-most-once, no ordering guarantee across
//! distinct channels. Payloads published while nobody listens are lost.
//! The [`ContextBus`] trait keeps that contract behind a narrow seam so a
//! stricter transport could be substituted without touching store logic.

pub mod memory;

pub use memory::InProcessBus;

use crate::domain::{Context, ContextType};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Publish/subscribe channel shared by every application instance.
///
/// Listeners receive matching payloads through an mpsc receiver, which the
/// owner drains on its own thread — delivery is asynchronous by
/// construction, and a broadcaster's own listeners hear its broadcasts too.
pub trait ContextBus: Send + Sync {
    /// Fire-and-forget publish on the app (default) channel.
    fn broadcast(&self, context: Context) {
        self.broadcast_scoped(None, context);
    }

    /// Listen for a context type on the app (default) channel.
    fn add_context_listener(&self, context_type: ContextType) -> (Subscription, Receiver<Context>) {
        self.listen_scoped(None, context_type)
    }

    /// Publish scoped to a named channel (`None` = app channel).
    fn broadcast_scoped(&self, channel: Option<&str>, context: Context);

    /// Listen scoped to a named channel (`None` = app channel).
    fn listen_scoped(
        &self,
        channel: Option<&str>,
        context_type: ContextType,
    ) -> (Subscription, Receiver<Context>);
}

/// A named channel handle with the same broadcast/listen contract as the
/// app channel, scoped to its name. Channels are isolated from each other
/// and from the app channel.
#[derive(Clone)]
pub struct Channel {
    name: String,
    bus: Arc<dyn ContextBus>,
}

impl Channel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn broadcast(&self, context: Context) {
        self.bus.broadcast_scoped(Some(&self.name), context);
    }

    pub fn add_context_listener(
        &self,
        context_type: ContextType,
    ) -> (Subscription, Receiver<Context>) {
        self.bus.listen_scoped(Some(&self.name), context_type)
    }
}

/// Obtain a handle to a named channel, creating it on first use.
pub fn get_or_create_channel(bus: &Arc<dyn ContextBus>, name: impl Into<String>) -> Channel {
    Channel {
        name: name.into(),
        bus: Arc::clone(bus),
    }
}

/// Registration handle for one listener. Unsubscribes explicitly or on drop,
/// so a torn-down view never leaks its listener.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

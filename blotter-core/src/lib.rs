//! Blotter core — order domain types, store transitions, fill simulation,
//! and the cross-app context bus.
//!
//! The pieces, leaves first:
//! - Domain types (orders, ids, wire envelopes)
//! - Order store with copy-on-write snapshots and explicit outcomes
//! - Fill simulator: pure increment plan + cancellable timed driver
//! - Context bus: fire-and-forget pub/sub behind a narrow trait
//! - Sessions: one app's identity, store, listeners, and simulator
//! - Order entry drafts and TOML configuration

pub mod bus;
pub mod config;
pub mod domain;
pub mod entry;
pub mod fill;
pub mod session;
pub mod store;

pub use bus::{get_or_create_channel, Channel, ContextBus, InProcessBus, Subscription};
pub use config::{BlotterConfig, ConfigError};
pub use domain::{AppName, Context, ContextType, Order, OrderId, OrderStatus};
pub use entry::{DraftError, DraftField, OrderDraft};
pub use fill::{FillError, FillEvent, FillPhase, FillPlan, FillSimulator};
pub use session::{FillSettings, Session, SessionError, SessionEvent};
pub use store::{FillPatch, OrderStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses a thread boundary is
    /// Send + Sync. The TUI hands snapshots and bus handles across threads;
    /// a regression here should break the build, not the runtime.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Context>();
        require_sync::<domain::Context>();
        require_send::<store::OrderStore>();
        require_sync::<store::OrderStore>();
        require_send::<fill::FillEvent>();
        require_sync::<fill::FillEvent>();
        require_send::<fill::FillSimulator>();
        require_sync::<fill::FillSimulator>();
        require_send::<bus::InProcessBus>();
        require_sync::<bus::InProcessBus>();
        require_send::<bus::Subscription>();
        require_send::<session::SessionEvent>();
        require_sync::<session::SessionEvent>();
        require_send::<config::BlotterConfig>();
        require_sync::<config::BlotterConfig>();
    }
}

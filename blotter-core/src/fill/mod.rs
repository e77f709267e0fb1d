//! Fill simulation — pure increment planning plus the timed driver.

pub mod plan;
pub mod simulator;

pub use plan::{FillPhase, FillPlan, FillStep};
pub use simulator::{FillError, FillEvent, FillSimulator};

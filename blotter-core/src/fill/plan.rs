//! Pure fill progression — the state machine behind the simulator.
//!
//! Each step advances the executed quantity by 25% of the target (rounded
//! to whole units). The step on which the cumulative amount reaches or
//! would pass the target clamps to exactly the target and goes terminal in
//! the same transition.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of one simulated execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPhase {
    /// Created, no increment applied yet.
    Pending,
    /// At least one increment applied, target not yet reached.
    Working,
    /// Target reached; no further steps.
    Filled,
}

/// Result of one [`FillPlan::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStep {
    pub executed_quantity: u32,
    pub terminal: bool,
}

/// Deterministic increment schedule for a single order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    target_quantity: u32,
    increment: u32,
    executed_quantity: u32,
    phase: FillPhase,
}

impl FillPlan {
    /// Default schedule: 25% of the target per step.
    pub fn new(target_quantity: u32) -> Self {
        Self::with_fraction(target_quantity, 0.25)
    }

    /// Schedule with a custom per-step fraction of the target.
    pub fn with_fraction(target_quantity: u32, fraction: f64) -> Self {
        let raw = (f64::from(target_quantity) * fraction).round() as u32;
        // A zero increment would never converge on a nonzero target.
        let increment = if target_quantity > 0 { raw.max(1) } else { 0 };
        Self {
            target_quantity,
            increment,
            executed_quantity: 0,
            phase: FillPhase::Pending,
        }
    }

    pub fn phase(&self) -> FillPhase {
        self.phase
    }

    pub fn executed_quantity(&self) -> u32 {
        self.executed_quantity
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn is_complete(&self) -> bool {
        self.phase == FillPhase::Filled
    }

    /// Apply one increment. Terminal steps clamp the executed quantity to
    /// the target; advancing a completed plan is a no-op that stays
    /// terminal.
    pub fn advance(&mut self) -> FillStep {
        if self.phase == FillPhase::Filled {
            return FillStep {
                executed_quantity: self.executed_quantity,
                terminal: true,
            };
        }

        let next = self.executed_quantity.saturating_add(self.increment);
        if next >= self.target_quantity {
            self.executed_quantity = self.target_quantity;
            self.phase = FillPhase::Filled;
            FillStep {
                executed_quantity: self.executed_quantity,
                terminal: true,
            }
        } else {
            self.executed_quantity = next;
            self.phase = FillPhase::Working;
            FillStep {
                executed_quantity: next,
                terminal: false,
            }
        }
    }
}

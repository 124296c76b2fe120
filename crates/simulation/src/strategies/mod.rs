//! Rebalancing policies.
//!
//! A policy decides where the range starts and when and where it moves.
//! It is pure tick geometry: converting the held tokens into liquidity at
//! the new bounds stays with the engine.

mod lazy;

pub use lazy::LazyRecenter;

use rangesim_domain::TickRange;

/// What a policy sees at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyContext {
    /// Floored tick of the current observation.
    pub tick: i32,
    /// Bounds currently held.
    pub range: TickRange,
}

/// What to do with the position at this observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    /// Keep the current range.
    Hold,
    /// Replace the range with new bounds.
    Recenter(TickRange),
}

/// Decides whether and where to move the position's range.
pub trait RebalancePolicy {
    /// Places the range for the first observation of a run.
    fn initial_range(&self, tick: i32) -> TickRange;

    /// Evaluates one observation against the held range.
    fn evaluate(&self, context: &PolicyContext) -> PolicyAction;

    /// Human-readable policy name for logs and reports.
    fn name(&self) -> &'static str;
}

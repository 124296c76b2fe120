//! Replay engine for concentrated-range backtests: the lazy re-center
//! policy, block-weighted occupancy accounting, the hold baseline for
//! deviation metrics, and the loop that drives a swap trace through them.

pub mod baseline;
pub mod engine;
pub mod error;
pub mod occupancy;
pub mod prelude;
pub mod state;
pub mod strategies;

// Re-export for easier access
pub use baseline::HoldBaseline;
pub use engine::BacktestEngine;
pub use error::EngineError;
pub use occupancy::Occupancy;
pub use state::{BacktestConfig, BacktestReport, RebalanceEvent};
pub use strategies::{LazyRecenter, PolicyAction, PolicyContext, RebalancePolicy};

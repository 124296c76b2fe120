//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use rangesim_simulation::prelude::*;
//! ```

// Engine
pub use crate::engine::BacktestEngine;

// Errors
pub use crate::error::EngineError;

// Hold baseline
pub use crate::baseline::HoldBaseline;

// Occupancy accounting
pub use crate::occupancy::Occupancy;

// Run configuration and results
pub use crate::state::{BacktestConfig, BacktestReport, RebalanceEvent};

// Policies
pub use crate::strategies::{LazyRecenter, PolicyAction, PolicyContext, RebalancePolicy};

//! Run configuration and result types.
//!
//! This module carries the per-run knobs for a backtest and the summary
//! the engine hands back once the trace is replayed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rangesim_domain::{RangePosition, TickRange};

/// Configuration for a backtest run. Range geometry lives in the policy;
/// this carries everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Emit a snapshot every this many observations.
    pub snapshot_interval: u64,
    /// Seed capital in token0, human units.
    pub notional0: Decimal,
    /// Seed capital in token1, human units.
    pub notional1: Decimal,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 1_000,
            notional0: Decimal::ONE,
            notional1: Decimal::ONE,
        }
    }
}

impl BacktestConfig {
    /// Sets the snapshot cadence. Clamped to at least one observation.
    #[must_use]
    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval.max(1);
        self
    }

    /// Sets the seed capital per token, in human units.
    #[must_use]
    pub fn with_notionals(mut self, notional0: Decimal, notional1: Decimal) -> Self {
        self.notional0 = notional0;
        self.notional1 = notional1;
        self
    }
}

/// One executed re-center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    /// Composite block key of the triggering observation.
    pub block: u64,
    /// Bounds given up.
    pub from: TickRange,
    /// Bounds taken on.
    pub to: TickRange,
    /// Liquidity before the move.
    pub liquidity_before: Decimal,
    /// Liquidity the held tokens buy at the new bounds.
    pub liquidity_after: Decimal,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Observations replayed.
    pub observations: u64,
    /// Composite key of the first observation.
    pub first_block: u64,
    /// Composite key of the last observation.
    pub last_block: u64,
    /// Every re-center in trace order.
    pub rebalances: Vec<RebalanceEvent>,
    /// Blocks credited as in range.
    pub blocks_in_range: u64,
    /// Share of elapsed blocks spent in range, in `[0, 1]`.
    pub in_range_fraction: Decimal,
    /// Snapshots emitted into the sink.
    pub snapshots_written: u64,
    /// Position as of the last observation.
    pub final_position: RangePosition,
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time record of position state and performance, emitted
/// periodically by the backtest engine. Write-only: never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Composite block key of the observation that produced this row.
    pub block: u64,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub tick: i32,
    /// Raw token1/token0 price (square of the sqrt price), unscaled.
    pub price: Decimal,
    pub liquidity: Decimal,
    /// Position value measured in token0, scaled to human units.
    pub amount0: Decimal,
    /// Position value measured in token1, scaled to human units.
    pub amount1: Decimal,
    /// Block-weighted share of elapsed blocks spent in range, percent.
    pub in_range_pct: Decimal,
    /// Signed deviation from the hold baseline in token0 terms, percent.
    pub il0_pct: Decimal,
    /// Signed deviation from the hold baseline in token1 terms, percent.
    pub il1_pct: Decimal,
}

/// Receives snapshots as the engine emits them.
///
/// Implementations make each record durable before returning, so a halted
/// run keeps everything already handed over.
pub trait SnapshotSink {
    fn record(&mut self, snapshot: &PositionSnapshot) -> std::io::Result<()>;
}

/// Sink that keeps snapshots in memory. Useful when the caller wants the
/// rows back instead of a file.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub snapshots: Vec<PositionSnapshot>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSink for MemorySink {
    fn record(&mut self, snapshot: &PositionSnapshot) -> std::io::Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

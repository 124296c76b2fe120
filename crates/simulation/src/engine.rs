//! The replay loop.
//!
//! Seeds a position from the first observation of a swap trace, then
//! drives every subsequent observation through the rebalance policy,
//! occupancy accounting and the snapshot sink. The engine owns the token
//! accounting around a re-center: the policy only says where the range
//! goes, the engine converts whatever the position held into liquidity at
//! the new bounds.

use rust_decimal::Decimal;
use tracing::{debug, info};

use rangesim_domain::math::concentrated_liquidity::{liquidity_for_value, liquidity_from_amounts};
use rangesim_domain::metrics::valuation::{deviation_pct, value_in_token0, value_in_token1};
use rangesim_domain::{
    PoolConfig, PositionSnapshot, RangePosition, SnapshotSink, SqrtPrice, SwapObservation,
    TickRange,
};

use crate::baseline::HoldBaseline;
use crate::error::EngineError;
use crate::occupancy::Occupancy;
use crate::state::{BacktestConfig, BacktestReport, RebalanceEvent};
use crate::strategies::{PolicyAction, PolicyContext, RebalancePolicy};

/// Replays a swap trace against a single managed range position.
pub struct BacktestEngine<P> {
    pool: PoolConfig,
    config: BacktestConfig,
    policy: P,
}

impl<P: RebalancePolicy> BacktestEngine<P> {
    /// Creates an engine for one pool, config and policy.
    #[must_use]
    pub fn new(pool: PoolConfig, config: BacktestConfig, policy: P) -> Self {
        Self {
            pool,
            config,
            policy,
        }
    }

    /// Runs the full trace, emitting snapshots into `sink`.
    ///
    /// Observations must be sorted by composite block key; a violation
    /// means the persisted trace is corrupt, and the run halts rather
    /// than produce numbers from a scrambled timeline. Snapshots already
    /// handed to the sink stay written.
    ///
    /// # Errors
    /// Returns an [`EngineError`] on an empty or unordered trace, on math
    /// failures, or when the sink rejects a snapshot.
    pub fn run<S: SnapshotSink>(
        &self,
        observations: &[SwapObservation],
        sink: &mut S,
    ) -> Result<BacktestReport, EngineError> {
        let first = observations.first().ok_or(EngineError::EmptyTrace)?;

        // Seed position and hold baseline from the first observation.
        let sqrt_price = first.sqrt_price()?;
        let tick = sqrt_price.tick()?;
        let range = self.policy.initial_range(tick);
        let notional0 = self.config.notional0 * self.pool.scale0();
        let notional1 = self.config.notional1 * self.pool.scale1();
        let value1 = value_in_token1(notional0, notional1, sqrt_price.price());
        let liquidity =
            liquidity_for_value(value1, range.sqrt_price_lower()?, range.sqrt_price_upper()?)?;
        let mut position = RangePosition::new(range, liquidity);
        let baseline = HoldBaseline::capture(position, sqrt_price)?;
        info!(
            policy = self.policy.name(),
            tick,
            lower = range.tick_lower,
            upper = range.tick_upper,
            %liquidity,
            "Seeded position"
        );

        let mut occupancy = Occupancy::new(first.block, position.range.contains(sqrt_price)?);
        let mut rebalances: Vec<RebalanceEvent> = Vec::new();
        let mut snapshots_written = 0u64;
        let mut last_block = first.block;

        for (index, observation) in observations.iter().enumerate() {
            if observation.block < last_block {
                return Err(EngineError::NonMonotonicTrace {
                    prev: last_block,
                    next: observation.block,
                });
            }
            last_block = observation.block;

            let sqrt_price = observation.sqrt_price()?;
            let tick = sqrt_price.tick()?;

            if index > 0 {
                // Move the range first so occupancy judges this
                // observation against the bounds actually held from here.
                let action = self.policy.evaluate(&PolicyContext {
                    tick,
                    range: position.range,
                });
                if let PolicyAction::Recenter(new_range) = action {
                    position = self.recenter(
                        &position,
                        sqrt_price,
                        new_range,
                        observation.block,
                        &mut rebalances,
                    )?;
                }
                occupancy.step(observation.block, position.range.contains(sqrt_price)?);
            }

            if index as u64 % self.config.snapshot_interval == 0 {
                let snapshot =
                    self.snapshot(observation.block, tick, sqrt_price, &position, &baseline, &occupancy)?;
                sink.record(&snapshot)?;
                snapshots_written += 1;
            }
        }

        Ok(BacktestReport {
            observations: observations.len() as u64,
            first_block: first.block,
            last_block,
            rebalances,
            blocks_in_range: occupancy.blocks_in_range(),
            in_range_fraction: occupancy.fraction(),
            snapshots_written,
            final_position: position,
        })
    }

    /// Converts the held tokens into liquidity at the new bounds.
    ///
    /// The policy only moves once price is outside the old range by more
    /// than the tolerance band, so the composition is single-sided and
    /// the price is single-sided relative to the new bounds as well.
    fn recenter(
        &self,
        position: &RangePosition,
        sqrt_price: SqrtPrice,
        new_range: TickRange,
        block: u64,
        rebalances: &mut Vec<RebalanceEvent>,
    ) -> Result<RangePosition, EngineError> {
        let (amount0, amount1) = position.amounts(sqrt_price)?;
        let liquidity = liquidity_from_amounts(
            amount0,
            amount1,
            sqrt_price.value,
            new_range.sqrt_price_lower()?,
            new_range.sqrt_price_upper()?,
        )?;
        debug!(
            block,
            old_lower = position.range.tick_lower,
            old_upper = position.range.tick_upper,
            new_lower = new_range.tick_lower,
            new_upper = new_range.tick_upper,
            %liquidity,
            "Re-centering position"
        );
        rebalances.push(RebalanceEvent {
            block,
            from: position.range,
            to: new_range,
            liquidity_before: position.liquidity,
            liquidity_after: liquidity,
        });
        Ok(RangePosition::new(new_range, liquidity))
    }

    fn snapshot(
        &self,
        block: u64,
        tick: i32,
        sqrt_price: SqrtPrice,
        position: &RangePosition,
        baseline: &HoldBaseline,
        occupancy: &Occupancy,
    ) -> Result<PositionSnapshot, EngineError> {
        let price = sqrt_price.price();
        let (amount0, amount1) = position.amounts(sqrt_price)?;
        let value0 = value_in_token0(amount0, amount1, price)?;
        let value1 = value_in_token1(amount0, amount1, price);
        Ok(PositionSnapshot {
            block,
            tick_lower: position.range.tick_lower,
            tick_upper: position.range.tick_upper,
            tick,
            price,
            liquidity: position.liquidity,
            amount0: value0 / self.pool.scale0(),
            amount1: value1 / self.pool.scale1(),
            in_range_pct: occupancy.fraction() * Decimal::ONE_HUNDRED,
            il0_pct: deviation_pct(value0, baseline.value0())?,
            il1_pct: deviation_pct(value1, baseline.value1())?,
        })
    }
}

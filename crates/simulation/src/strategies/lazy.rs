//! Lazy just-in-time re-centering.
//!
//! The position is left alone as long as the tick stays within one
//! spacing of its bounds. Once price escapes that tolerance band the range
//! moves the minimum distance that puts it back next to the market: the
//! new range is parked immediately beyond the aligned current tick, on the
//! side the price broke out of, rather than centered around it. If price
//! reverts, the old ground is covered again without a second move.

use rangesim_domain::TickRange;
use rangesim_domain::math::tick::align_to_spacing;

use super::{PolicyAction, PolicyContext, RebalancePolicy};
use crate::error::EngineError;

/// Width and grid of the managed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyRecenter {
    width: i32,
    spacing: i32,
}

impl LazyRecenter {
    /// Creates the policy. `width` is in ticks and must be a positive
    /// multiple of `spacing`.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidPolicyWidth`] otherwise.
    pub fn new(width: i32, spacing: i32) -> Result<Self, EngineError> {
        if spacing <= 0 || width <= 0 || width % spacing != 0 {
            return Err(EngineError::InvalidPolicyWidth { width, spacing });
        }
        Ok(Self { width, spacing })
    }

    /// Builds the policy from a width expressed in spacing units.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidPolicyWidth`] if the width is not
    /// positive or overflows.
    pub fn from_spacings(width_spacings: i32, spacing: i32) -> Result<Self, EngineError> {
        let width = width_spacings
            .checked_mul(spacing)
            .ok_or(EngineError::InvalidPolicyWidth {
                width: width_spacings,
                spacing,
            })?;
        Self::new(width, spacing)
    }

    /// Range width in ticks.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Tick spacing of the grid.
    #[must_use]
    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    /// Minimum-distance placement once price has escaped the band.
    fn near(&self, tick: i32, escaped_below: bool) -> TickRange {
        let aligned = align_to_spacing(tick, self.spacing);
        if escaped_below {
            // Price fell through the lower bound: park the range one
            // spacing above the aligned tick, just out of the market.
            let tick_lower = aligned + self.spacing;
            TickRange {
                tick_lower,
                tick_upper: tick_lower + self.width,
            }
        } else {
            // Price broke out above: park the range directly below.
            let tick_upper = aligned;
            TickRange {
                tick_lower: tick_upper - self.width,
                tick_upper,
            }
        }
    }
}

impl RebalancePolicy for LazyRecenter {
    /// Symmetric placement around the aligned tick.
    ///
    /// An even number of spacings splits evenly; an odd number shifts the
    /// midpoint by half a spacing, which stays on the grid because the
    /// width is an odd multiple of it.
    fn initial_range(&self, tick: i32) -> TickRange {
        let aligned = align_to_spacing(tick, self.spacing);
        let tick_lower = if (self.width / self.spacing) % 2 == 0 {
            aligned - self.width / 2
        } else {
            aligned + (self.spacing - self.width) / 2
        };
        TickRange {
            tick_lower,
            tick_upper: tick_lower + self.width,
        }
    }

    fn evaluate(&self, context: &PolicyContext) -> PolicyAction {
        if context.range.within_band(context.tick, self.spacing) {
            return PolicyAction::Hold;
        }
        let escaped_below = context.tick < context.range.tick_lower - self.spacing;
        PolicyAction::Recenter(self.near(context.tick, escaped_below))
    }

    fn name(&self) -> &'static str {
        "Lazy Recenter"
    }
}

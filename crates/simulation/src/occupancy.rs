//! Block-weighted time-in-range accounting.
//!
//! Occupancy is a pure step function over `(block, in_range)` pairs, so a
//! replay of the same trace always reproduces the same figures. Between
//! two in-range observations every elapsed block counts; an observation
//! that lands out of range forfeits its own block but keeps the stretch
//! leading up to it; nothing accrues while the position is out.

use rust_decimal::Decimal;

/// Running tally of blocks spent in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    first_block: u64,
    last_block: u64,
    blocks_in_range: u64,
    was_in_range: bool,
}

impl Occupancy {
    /// Starts accounting at the first observation. No blocks have elapsed
    /// yet, so nothing accrues regardless of `in_range`.
    #[must_use]
    pub fn new(first_block: u64, in_range: bool) -> Self {
        Self {
            first_block,
            last_block: first_block,
            blocks_in_range: 0,
            was_in_range: in_range,
        }
    }

    /// Advances the tally to the next observation.
    pub fn step(&mut self, block: u64, in_range: bool) {
        debug_assert!(block >= self.last_block, "observations must be block-ordered");
        if self.was_in_range {
            let delta = block - self.last_block;
            if in_range {
                self.blocks_in_range += delta;
            } else {
                self.blocks_in_range += delta.saturating_sub(1);
            }
        }
        self.last_block = block;
        self.was_in_range = in_range;
    }

    /// Blocks credited as in range so far.
    #[must_use]
    pub fn blocks_in_range(&self) -> u64 {
        self.blocks_in_range
    }

    /// Blocks elapsed since the first observation.
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        self.last_block - self.first_block
    }

    /// Share of elapsed blocks spent in range, in `[0, 1]`. Zero before
    /// any block has elapsed.
    #[must_use]
    pub fn fraction(&self) -> Decimal {
        let elapsed = self.elapsed();
        if elapsed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.blocks_in_range) / Decimal::from(elapsed)
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::tick::{align_to_spacing, tick_to_sqrt_price};
use crate::value_objects::sqrt_price::SqrtPrice;

/// A position's lower/upper tick bounds.
///
/// The sqrt-price bounds are always derived from the ticks on demand, never
/// stored, so the two representations cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl TickRange {
    pub fn new(tick_lower: i32, tick_upper: i32) -> Result<Self, MathError> {
        if tick_lower >= tick_upper {
            return Err(MathError::InvalidRange {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        Ok(Self {
            tick_lower,
            tick_upper,
        })
    }

    /// Sqrt price at the lower bound.
    pub fn sqrt_price_lower(&self) -> Result<Decimal, MathError> {
        tick_to_sqrt_price(self.tick_lower)
    }

    /// Sqrt price at the upper bound.
    pub fn sqrt_price_upper(&self) -> Result<Decimal, MathError> {
        tick_to_sqrt_price(self.tick_upper)
    }

    /// Whether the price sits inside the bounds, inclusive on both ends.
    pub fn contains(&self, sqrt_price: SqrtPrice) -> Result<bool, MathError> {
        Ok(sqrt_price.value >= self.sqrt_price_lower()?
            && sqrt_price.value <= self.sqrt_price_upper()?)
    }

    /// Whether a tick lies within one spacing of the bounds. Leaving this
    /// band is what arms a re-center; the slack keeps boundary noise from
    /// oscillating the position.
    #[must_use]
    pub fn within_band(&self, tick: i32, spacing: i32) -> bool {
        tick >= self.tick_lower - spacing && tick <= self.tick_upper + spacing
    }

    /// Whether both bounds sit on the spacing grid.
    #[must_use]
    pub fn is_aligned(&self, spacing: i32) -> bool {
        align_to_spacing(self.tick_lower, spacing) == self.tick_lower
            && align_to_spacing(self.tick_upper, spacing) == self.tick_upper
    }

    /// Width in ticks.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.tick_upper - self.tick_lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted_bounds() {
        assert!(TickRange::new(100, 100).is_err());
        assert!(TickRange::new(200, 100).is_err());
        assert!(TickRange::new(-200, -100).is_ok());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = TickRange::new(-100, 100).unwrap();
        let lower = SqrtPrice::new(range.sqrt_price_lower().unwrap());
        let upper = SqrtPrice::new(range.sqrt_price_upper().unwrap());
        assert!(range.contains(lower).unwrap());
        assert!(range.contains(upper).unwrap());
        assert!(range.contains(SqrtPrice::new(Decimal::ONE)).unwrap());
        assert!(!range
            .contains(SqrtPrice::new(upper.value + Decimal::ONE))
            .unwrap());
    }

    #[test]
    fn test_within_band_gives_one_spacing_slack() {
        let range = TickRange::new(10000, 14000).unwrap();
        assert!(range.within_band(14200, 200));
        assert!(!range.within_band(14201, 200));
        assert!(range.within_band(9800, 200));
        assert!(!range.within_band(9799, 200));
    }

    #[test]
    fn test_alignment_check() {
        let range = TickRange::new(10000, 14000).unwrap();
        assert!(range.is_aligned(200));
        assert!(range.is_aligned(1000));
        assert!(!range.is_aligned(300));
        assert_eq!(range.width(), 4000);
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::concentrated_liquidity::amounts_for_liquidity;
use crate::value_objects::sqrt_price::SqrtPrice;
use crate::value_objects::tick_range::TickRange;

/// A single concentrated-liquidity position: bounds plus virtual liquidity.
///
/// A re-center replaces the whole value rather than patching it in place;
/// bounds and liquidity are always recomputed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePosition {
    pub range: TickRange,
    pub liquidity: Decimal,
}

impl RangePosition {
    #[must_use]
    pub fn new(range: TickRange, liquidity: Decimal) -> Self {
        Self { range, liquidity }
    }

    /// Token composition at the given price.
    pub fn amounts(&self, sqrt_price: SqrtPrice) -> Result<(Decimal, Decimal), MathError> {
        amounts_for_liquidity(
            self.liquidity,
            sqrt_price.value,
            self.range.sqrt_price_lower()?,
            self.range.sqrt_price_upper()?,
        )
    }
}

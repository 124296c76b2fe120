use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::MathError;

/// Lowest tick the decimal conversions support.
pub const MIN_TICK: i32 = -443_636;
/// Highest tick the decimal conversions support.
///
/// Beyond ±443636 the 96-bit mantissa can no longer hold 18 significant
/// digits of the sqrt price, which is the precision these conversions
/// promise.
pub const MAX_TICK: i32 = 443_636;

/// sqrt(1.0001), the per-tick sqrt-price ratio.
const SQRT_1_0001: Decimal = dec!(1.0000499987500624960940234170);
/// ln(sqrt(1.0001)), the width of one tick in log space.
const LN_SQRT_1_0001: Decimal = dec!(0.0000499975001666541676665833);

/// Returns the sqrt price corresponding to a given tick.
/// sqrt(P) = 1.0001 ^ (tick / 2)
pub fn tick_to_sqrt_price(tick: i32) -> Result<Decimal, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }
    SQRT_1_0001
        .checked_powi(i64::from(tick))
        .ok_or(MathError::TickOutOfBounds(tick))
}

/// Returns the tick corresponding to a given sqrt price.
/// tick = floor(2 * log_1.0001(sqrt(P)))
///
/// Flooring (not rounding, not truncating toward zero) matches how pools
/// convert a continuous price to a discrete tick on-chain; anything else
/// drifts from recorded state after enough re-centers.
pub fn sqrt_price_to_tick(sqrt_price: Decimal) -> Result<i32, MathError> {
    if sqrt_price <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice(sqrt_price));
    }
    let raw = sqrt_price.ln() / LN_SQRT_1_0001;
    let floored = raw
        .floor()
        .to_i64()
        .ok_or(MathError::SqrtPriceOutOfBounds(sqrt_price))?;
    if floored < i64::from(MIN_TICK) - 1 || floored > i64::from(MAX_TICK) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price));
    }

    // The fixed-precision logarithm can land one tick off right at a
    // boundary. Settle against the exact forward mapping so the result is
    // the unique t with forward(t) <= sqrt_price < forward(t + 1).
    let mut tick = floored as i32;
    if tick < MAX_TICK && tick_to_sqrt_price(tick + 1)? <= sqrt_price {
        tick += 1;
    } else if tick >= MIN_TICK && tick_to_sqrt_price(tick)? > sqrt_price {
        tick -= 1;
    }

    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price));
    }
    Ok(tick)
}

/// Aligns a tick to the spacing grid, flooring toward negative infinity,
/// so negative ticks move further negative rather than toward zero.
///
/// `spacing` must be positive.
pub fn align_to_spacing(tick: i32, spacing: i32) -> i32 {
    debug_assert!(spacing > 0, "tick spacing must be positive");
    tick.div_euclid(spacing) * spacing
}

use primitive_types::U256;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::math::tick::{MAX_TICK, MIN_TICK};

/// Errors produced by the price/liquidity math.
///
/// `PriceInsideRange` is the one variant that signals caller misuse rather
/// than bad data: liquidity cannot be backed out of a single-sided amount
/// while the price needs both tokens. It must be propagated, never dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("tick {0} is outside the supported range [{min}, {max}]", min = MIN_TICK, max = MAX_TICK)]
    TickOutOfBounds(i32),

    #[error("sqrt price must be positive, got {0}")]
    NonPositiveSqrtPrice(Decimal),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("sqrt price {0} maps outside the supported tick range")]
    SqrtPriceOutOfBounds(Decimal),

    #[error("sqrtPriceX96 {0} does not fit the on-chain 160-bit width")]
    SqrtPriceX96OutOfRange(U256),

    #[error("invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidRange { lower: i32, upper: i32 },

    #[error("invalid sqrt-price bounds: lower {lower} must be below upper {upper}")]
    InvalidSqrtBounds { lower: Decimal, upper: Decimal },

    #[error(
        "sqrt price {sqrt_price} is strictly inside [{sqrt_lower}, {sqrt_upper}]; \
         liquidity from a single-sided amount needs the price at or beyond a bound"
    )]
    PriceInsideRange {
        sqrt_price: Decimal,
        sqrt_lower: Decimal,
        sqrt_upper: Decimal,
    },

    #[error("reference value is zero, deviation is undefined")]
    ZeroReferenceValue,
}

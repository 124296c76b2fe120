use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::tick::sqrt_price_to_tick;

/// 2^48. The 96-bit shift is applied in two halves because 2^96 itself does
/// not fit the decimal mantissa.
const Q48: Decimal = dec!(281474976710656);

/// Square root of the token1/token0 price, the pool's native price axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SqrtPrice {
    pub value: Decimal,
}

impl SqrtPrice {
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Reconstructs the decimal sqrt price from the on-chain Q64.96
    /// encoding: sqrt(P) = x96 / 2^96.
    pub fn from_x96(x96: U256) -> Result<Self, MathError> {
        // sqrtPriceX96 is a uint160 on-chain; anything wider is corrupt.
        if x96.bits() > 160 {
            return Err(MathError::SqrtPriceX96OutOfRange(x96));
        }
        let hi = (x96 >> 96).as_u64();
        let lo = (x96 & ((U256::one() << 96) - U256::one())).as_u128();
        let lo = Decimal::from_u128(lo).ok_or(MathError::SqrtPriceX96OutOfRange(x96))?;
        Ok(Self {
            value: Decimal::from(hi) + lo / Q48 / Q48,
        })
    }

    /// The price of token1 in terms of token0.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.value * self.value
    }

    /// The tick this price falls in (floored).
    pub fn tick(&self) -> Result<i32, MathError> {
        sqrt_price_to_tick(self.value)
    }
}

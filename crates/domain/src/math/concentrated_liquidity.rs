use rust_decimal::Decimal;

use crate::error::MathError;

fn ordered(a: Decimal, b: Decimal) -> (Decimal, Decimal) {
    if a < b { (a, b) } else { (b, a) }
}

/// Amount of token0 held across a sqrt-price interval.
/// delta_x = L * (1/sqrt(P_a) - 1/sqrt(P_b)), with P_a < P_b
pub fn amount0_delta(
    liquidity: Decimal,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<Decimal, MathError> {
    if sqrt_price_a <= Decimal::ZERO || sqrt_price_b <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice(sqrt_price_a.min(sqrt_price_b)));
    }
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    Ok(liquidity * (upper - lower) / (lower * upper))
}

/// Amount of token1 held across a sqrt-price interval.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a)), with P_a < P_b
pub fn amount1_delta(liquidity: Decimal, sqrt_price_a: Decimal, sqrt_price_b: Decimal) -> Decimal {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    liquidity * (upper - lower)
}

/// Token composition of a range position at the given price.
///
/// Standard three-region model: strictly inside the bounds both tokens are
/// present; at or beyond a bound the position is entirely one token. The
/// boundary prices belong to the one-sided regions, the same rule
/// `liquidity_from_amounts` applies, so the two functions never disagree
/// about which side of the range a price is on.
pub fn amounts_for_liquidity(
    liquidity: Decimal,
    sqrt_price: Decimal,
    sqrt_lower: Decimal,
    sqrt_upper: Decimal,
) -> Result<(Decimal, Decimal), MathError> {
    if sqrt_price <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice(sqrt_price));
    }
    if sqrt_lower >= sqrt_upper {
        return Err(MathError::InvalidSqrtBounds {
            lower: sqrt_lower,
            upper: sqrt_upper,
        });
    }

    if sqrt_price <= sqrt_lower {
        // Parked below the range: all token0.
        Ok((amount0_delta(liquidity, sqrt_lower, sqrt_upper)?, Decimal::ZERO))
    } else if sqrt_price >= sqrt_upper {
        // Parked above the range: all token1.
        Ok((Decimal::ZERO, amount1_delta(liquidity, sqrt_lower, sqrt_upper)))
    } else {
        Ok((
            amount0_delta(liquidity, sqrt_price, sqrt_upper)?,
            amount1_delta(liquidity, sqrt_lower, sqrt_price),
        ))
    }
}

/// Liquidity implied by a single-sided deposit.
///
/// Uses `amount0` when the price sits at or below the lower bound and
/// `amount1` when at or above the upper bound. Strictly inside the range
/// neither amount determines liquidity on its own, so that case is an
/// explicit error rather than a guess.
pub fn liquidity_from_amounts(
    amount0: Decimal,
    amount1: Decimal,
    sqrt_price: Decimal,
    sqrt_lower: Decimal,
    sqrt_upper: Decimal,
) -> Result<Decimal, MathError> {
    if sqrt_price <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice(sqrt_price));
    }
    if sqrt_lower >= sqrt_upper {
        return Err(MathError::InvalidSqrtBounds {
            lower: sqrt_lower,
            upper: sqrt_upper,
        });
    }

    if sqrt_price <= sqrt_lower {
        // L = amount0 * (sqrt_lower * sqrt_upper) / (sqrt_upper - sqrt_lower)
        Ok(amount0 * sqrt_lower * sqrt_upper / (sqrt_upper - sqrt_lower))
    } else if sqrt_price >= sqrt_upper {
        // L = amount1 / (sqrt_upper - sqrt_lower)
        Ok(amount1 / (sqrt_upper - sqrt_lower))
    } else {
        Err(MathError::PriceInsideRange {
            sqrt_price,
            sqrt_lower,
            sqrt_upper,
        })
    }
}

/// Liquidity that spreads a token1-denominated value across the width of a
/// range: L = value1 / (sqrt_upper - sqrt_lower). Used when seeding a
/// position from notional capital.
pub fn liquidity_for_value(
    value1: Decimal,
    sqrt_lower: Decimal,
    sqrt_upper: Decimal,
) -> Result<Decimal, MathError> {
    if sqrt_lower >= sqrt_upper {
        return Err(MathError::InvalidSqrtBounds {
            lower: sqrt_lower,
            upper: sqrt_upper,
        });
    }
    Ok(value1 / (sqrt_upper - sqrt_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_deltas() {
        // Liquidity 1000, sqrt price from 1 to 2:
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let dy = amount1_delta(dec!(1000), Decimal::ONE, dec!(2));
        assert_eq!(dy, dec!(1000));

        let dx = amount0_delta(dec!(1000), Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(dx, dec!(500));
    }

    #[test]
    fn test_amounts_in_range() {
        // sqrt price 1.5 inside [1, 2]:
        // amount0 = 1000 * (1/1.5 - 1/2), amount1 = 1000 * (1.5 - 1)
        let (a0, a1) =
            amounts_for_liquidity(dec!(1000), dec!(1.5), Decimal::ONE, dec!(2)).unwrap();
        assert!((a0 - dec!(166.6666666666666666666666667)).abs() < dec!(0.000000001));
        assert_eq!(a1, dec!(500));
    }

    #[test]
    fn test_amounts_below_range() {
        let (a0, a1) =
            amounts_for_liquidity(dec!(1000), dec!(0.5), Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(a0, dec!(500));
        assert_eq!(a1, Decimal::ZERO);
    }

    #[test]
    fn test_amounts_above_range() {
        let (a0, a1) = amounts_for_liquidity(dec!(1000), dec!(3), Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(a0, Decimal::ZERO);
        assert_eq!(a1, dec!(1000));
    }

    #[test]
    fn test_amounts_at_exact_bounds() {
        // Boundary prices belong to the one-sided regions: at the lower
        // bound the position is entirely token0, at the upper entirely
        // token1.
        let (a0, a1) =
            amounts_for_liquidity(dec!(1000), Decimal::ONE, Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(a0, dec!(500));
        assert_eq!(a1, Decimal::ZERO);

        let (a0, a1) = amounts_for_liquidity(dec!(1000), dec!(2), Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(a0, Decimal::ZERO);
        assert_eq!(a1, dec!(1000));
    }

    #[test]
    fn test_liquidity_from_amount0_below_range() {
        // Inverse of test_amounts_below_range.
        let l = liquidity_from_amounts(dec!(500), Decimal::ZERO, dec!(0.5), Decimal::ONE, dec!(2))
            .unwrap();
        assert_eq!(l, dec!(1000));
    }

    #[test]
    fn test_liquidity_from_amount1_above_range() {
        let l = liquidity_from_amounts(Decimal::ZERO, dec!(1000), dec!(3), Decimal::ONE, dec!(2))
            .unwrap();
        assert_eq!(l, dec!(1000));
    }

    #[test]
    fn test_liquidity_at_exact_bounds() {
        // Same boundary rule as the forward direction.
        let at_lower =
            liquidity_from_amounts(dec!(500), Decimal::ZERO, Decimal::ONE, Decimal::ONE, dec!(2))
                .unwrap();
        assert_eq!(at_lower, dec!(1000));

        let at_upper =
            liquidity_from_amounts(Decimal::ZERO, dec!(1000), dec!(2), Decimal::ONE, dec!(2))
                .unwrap();
        assert_eq!(at_upper, dec!(1000));
    }

    #[test]
    fn test_liquidity_inside_range_is_rejected() {
        let err = liquidity_from_amounts(dec!(500), dec!(500), dec!(1.5), Decimal::ONE, dec!(2))
            .unwrap_err();
        assert!(matches!(err, MathError::PriceInsideRange { .. }));
    }

    #[test]
    fn test_liquidity_for_value() {
        let l = liquidity_for_value(dec!(1000), Decimal::ONE, dec!(2)).unwrap();
        assert_eq!(l, dec!(1000));

        assert!(matches!(
            liquidity_for_value(dec!(1000), dec!(2), dec!(2)),
            Err(MathError::InvalidSqrtBounds { .. })
        ));
    }
}

use rust_decimal::Decimal;

use crate::error::MathError;

/// Total value measured in token0: amount0 + amount1 / P.
pub fn value_in_token0(
    amount0: Decimal,
    amount1: Decimal,
    price: Decimal,
) -> Result<Decimal, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice(price));
    }
    Ok(amount0 + amount1 / price)
}

/// Total value measured in token1: amount0 * P + amount1.
pub fn value_in_token1(amount0: Decimal, amount1: Decimal, price: Decimal) -> Decimal {
    amount0 * price + amount1
}

/// Signed percentage deviation of `current` from `reference`.
/// Negative means the position is worth less than the reference.
pub fn deviation_pct(current: Decimal, reference: Decimal) -> Result<Decimal, MathError> {
    if reference.is_zero() {
        return Err(MathError::ZeroReferenceValue);
    }
    Ok(Decimal::ONE_HUNDRED * (current - reference) / reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_values_agree_through_price() {
        // value1 = value0 * P for any composition.
        let v0 = value_in_token0(dec!(3), dec!(8), dec!(4)).unwrap();
        let v1 = value_in_token1(dec!(3), dec!(8), dec!(4));
        assert_eq!(v0, dec!(5));
        assert_eq!(v1, dec!(20));
        assert_eq!(v1, v0 * dec!(4));
    }

    #[test]
    fn test_value_rejects_non_positive_price() {
        assert!(matches!(
            value_in_token0(dec!(1), dec!(1), Decimal::ZERO),
            Err(MathError::NonPositivePrice(_))
        ));
    }

    #[test]
    fn test_deviation_signs() {
        assert_eq!(deviation_pct(dec!(110), dec!(100)).unwrap(), dec!(10));
        assert_eq!(deviation_pct(dec!(90), dec!(100)).unwrap(), dec!(-10));
        assert_eq!(deviation_pct(dec!(100), dec!(100)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_deviation_rejects_zero_reference() {
        assert_eq!(
            deviation_pct(dec!(1), Decimal::ZERO),
            Err(MathError::ZeroReferenceValue)
        );
    }
}

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Largest token decimal count `Decimal` can scale by.
pub const MAX_DECIMALS: u32 = 28;

/// Static description of the pool whose trace is being replayed.
///
/// Token decimal counts are for display scaling only; the internal math is
/// decimal-precise and decimal-count-agnostic. Counts above 28 are not
/// representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool contract address, 0x-prefixed.
    pub address: String,
    /// First block of interest when no trace has been persisted yet.
    pub start_block: u64,
    /// Minimum distance between usable ticks for this pool.
    pub tick_spacing: i32,
    /// token0 decimal count.
    pub decimals0: u32,
    /// token1 decimal count.
    pub decimals1: u32,
}

impl PoolConfig {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            start_block: 0,
            tick_spacing: 1,
            decimals0: 18,
            decimals1: 18,
        }
    }

    #[must_use]
    pub fn with_start_block(mut self, start_block: u64) -> Self {
        self.start_block = start_block;
        self
    }

    #[must_use]
    pub fn with_tick_spacing(mut self, tick_spacing: i32) -> Self {
        self.tick_spacing = tick_spacing;
        self
    }

    /// Sets the token decimal counts, at most [`MAX_DECIMALS`] each.
    ///
    /// # Panics
    /// Panics if either count exceeds [`MAX_DECIMALS`].
    #[must_use]
    pub fn with_decimals(mut self, decimals0: u32, decimals1: u32) -> Self {
        assert!(
            decimals0 <= MAX_DECIMALS && decimals1 <= MAX_DECIMALS,
            "token decimal counts above {MAX_DECIMALS} are not representable"
        );
        self.decimals0 = decimals0;
        self.decimals1 = decimals1;
        self
    }

    /// 10^decimals0, the raw-to-human divisor for token0.
    #[must_use]
    pub fn scale0(&self) -> Decimal {
        Decimal::TEN.powi(i64::from(self.decimals0))
    }

    /// 10^decimals1, the raw-to-human divisor for token1.
    #[must_use]
    pub fn scale1(&self) -> Decimal {
        Decimal::TEN.powi(i64::from(self.decimals1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_defaults() {
        let pool = PoolConfig::new("0xabc");
        assert_eq!(pool.start_block, 0);
        assert_eq!(pool.tick_spacing, 1);
        assert_eq!(pool.decimals0, 18);
    }

    #[test]
    fn test_scales() {
        let pool = PoolConfig::new("0xabc").with_decimals(6, 18);
        assert_eq!(pool.scale0(), dec!(1000000));
        assert_eq!(pool.scale1(), dec!(1000000000000000000));
    }

    #[test]
    fn test_scales_at_the_decimal_limit() {
        let pool = PoolConfig::new("0xabc").with_decimals(28, 0);
        assert_eq!(pool.scale0(), dec!(10000000000000000000000000000));
        assert_eq!(pool.scale1(), Decimal::ONE);
    }

    #[test]
    #[should_panic(expected = "not representable")]
    fn test_rejects_decimals_above_the_limit() {
        let _ = PoolConfig::new("0xabc").with_decimals(29, 18);
    }
}

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::value_objects::sqrt_price::SqrtPrice;

/// One on-chain swap event, immutable once ingested.
///
/// `block` is a composite ordering key: `block_number * 1000 + tx_index`,
/// so a single integer sort reproduces on-chain order exactly. Raw chain
/// quantities keep their native widths (`sqrtPriceX96` is a uint160,
/// liquidity a uint128, the deltas signed int256 values that fit i128 in
/// practice); decimal conversion happens at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapObservation {
    pub block: u64,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub amount0: i128,
    pub amount1: i128,
}

impl SwapObservation {
    /// Packs a block number and intra-block transaction index into the
    /// composite ordering key.
    #[must_use]
    pub fn block_key(block_number: u64, tx_index: u64) -> u64 {
        block_number * 1000 + tx_index
    }

    /// The underlying chain block number.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.block / 1000
    }

    /// Decimal sqrt price reconstructed from the Q64.96 encoding.
    pub fn sqrt_price(&self) -> Result<SqrtPrice, MathError> {
        SqrtPrice::from_x96(self.sqrt_price_x96)
    }
}

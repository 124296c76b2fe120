//! Raw log decoding for concentrated-liquidity pool events.
//!
//! Swap, Mint and Burn events arrive as fixed-layout ABI words. The
//! decoders validate that each word actually fits the native width it is
//! narrowed to; a layout mismatch means the log stream is not what the
//! trace format assumes, and replaying it would silently corrupt results.

use primitive_types::{H256, U256};
use rangesim_domain::SwapObservation;
use thiserror::Error;

/// keccak256 of `Swap(address,address,int256,int256,uint160,uint128,int24)`.
pub const SWAP_TOPIC: H256 = H256([
    0xc4, 0x20, 0x79, 0xf9, 0x4a, 0x63, 0x50, 0xd7, 0xe6, 0x23, 0x5f, 0x29, 0x17, 0x49, 0x24,
    0xf9, 0x28, 0xcc, 0x2a, 0xc8, 0x18, 0xeb, 0x64, 0xfe, 0xd8, 0x00, 0x4e, 0x11, 0x5f, 0xbc,
    0xca, 0x67,
]);

/// keccak256 of `Mint(address,address,int24,int24,uint128,uint256,uint256)`.
pub const MINT_TOPIC: H256 = H256([
    0x7a, 0x53, 0x08, 0x0b, 0xa4, 0x14, 0x15, 0x8b, 0xe7, 0xec, 0x69, 0xb9, 0x87, 0xb5, 0xfb,
    0x7d, 0x07, 0xde, 0xe1, 0x01, 0xfe, 0x85, 0x48, 0x8f, 0x08, 0x53, 0xae, 0x16, 0x23, 0x9d,
    0x0b, 0xde,
]);

/// keccak256 of `Burn(address,int24,int24,uint128,uint256,uint256)`.
pub const BURN_TOPIC: H256 = H256([
    0x0c, 0x39, 0x6c, 0xd9, 0x89, 0xa3, 0x9f, 0x44, 0x59, 0xb5, 0xfa, 0x1a, 0xed, 0x6a, 0x9a,
    0x8d, 0xcd, 0xbc, 0x45, 0x90, 0x8a, 0xcf, 0xd6, 0x7e, 0x02, 0x8c, 0xd5, 0x68, 0xda, 0x98,
    0x98, 0x2c,
]);

/// Undressed log entry as returned by the query provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub block_number: u64,
    pub transaction_index: u64,
    pub transaction_hash: H256,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
}

/// Reasons a log cannot be decoded. All of them are fatal for the run: a
/// trace built from half-understood events is worse than no trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("log carries no topics")]
    NoTopics,
    #[error("unknown event topic {0:?}")]
    UnknownTopic(H256),
    #[error("{event} event expects {expected} topics, got {actual}")]
    TopicCount {
        event: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{event} event data must be {expected} bytes, got {actual}")]
    DataLength {
        event: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("word at byte offset {0} does not fit a signed 128-bit amount")]
    AmountOverflow(usize),
    #[error("liquidity word does not fit an unsigned 128-bit value")]
    LiquidityOverflow,
    #[error("amount word at byte offset {0} does not fit an unsigned 128-bit value")]
    UnsignedOverflow(usize),
    #[error("sqrtPriceX96 word exceeds the on-chain 160-bit width")]
    SqrtPriceOverflow,
    #[error("topic is not a sign-extended 32-bit tick")]
    BadTickTopic,
}

/// A mint or burn: liquidity and token amounts applied to a tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityChange {
    /// Composite ordering key, `block_number * 1000 + tx_index`.
    pub block: u64,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub amount0: u128,
    pub amount1: u128,
}

/// One decoded pool event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    Swap(SwapObservation),
    Mint(LiquidityChange),
    Burn(LiquidityChange),
}

impl PoolEvent {
    /// Composite ordering key of the underlying event.
    #[must_use]
    pub fn block(&self) -> u64 {
        match self {
            PoolEvent::Swap(observation) => observation.block,
            PoolEvent::Mint(change) | PoolEvent::Burn(change) => change.block,
        }
    }

    /// Returns the swap observation if this event is a swap.
    #[must_use]
    pub fn as_swap(&self) -> Option<&SwapObservation> {
        match self {
            PoolEvent::Swap(observation) => Some(observation),
            _ => None,
        }
    }
}

/// Decodes a raw log into a typed pool event, dispatching on the first
/// topic.
///
/// # Errors
/// Returns a [`DecodeError`] if the topic is unknown or any word fails
/// width validation.
pub fn decode_event(log: &RawLog) -> Result<PoolEvent, DecodeError> {
    let topic = *log.topics.first().ok_or(DecodeError::NoTopics)?;
    if topic == SWAP_TOPIC {
        decode_swap(log).map(PoolEvent::Swap)
    } else if topic == MINT_TOPIC {
        decode_change(log, "Mint", 128, 32).map(PoolEvent::Mint)
    } else if topic == BURN_TOPIC {
        decode_change(log, "Burn", 96, 0).map(PoolEvent::Burn)
    } else {
        Err(DecodeError::UnknownTopic(topic))
    }
}

/// Swap layout: amount0 (int256), amount1 (int256), sqrtPriceX96
/// (uint160), liquidity (uint128). Some deployments append the post-swap
/// tick as a fifth word; it is redundant with sqrtPriceX96 and skipped.
fn decode_swap(log: &RawLog) -> Result<SwapObservation, DecodeError> {
    if log.data.len() != 128 && log.data.len() != 160 {
        return Err(DecodeError::DataLength {
            event: "Swap",
            expected: 128,
            actual: log.data.len(),
        });
    }
    let amount0 = read_i128(&log.data, 0)?;
    let amount1 = read_i128(&log.data, 32)?;
    let sqrt_price_x96 = U256::from_big_endian(&log.data[64..96]);
    if sqrt_price_x96.bits() > 160 {
        return Err(DecodeError::SqrtPriceOverflow);
    }
    let liquidity = read_u128(&log.data, 96).map_err(|_| DecodeError::LiquidityOverflow)?;
    Ok(SwapObservation {
        block: SwapObservation::block_key(log.block_number, log.transaction_index),
        sqrt_price_x96,
        liquidity,
        amount0,
        amount1,
    })
}

/// Mint layout: sender, liquidity, amount0, amount1. Burn drops the sender
/// word. Tick bounds ride in the last two topics either way.
fn decode_change(
    log: &RawLog,
    event: &'static str,
    expected_len: usize,
    offset: usize,
) -> Result<LiquidityChange, DecodeError> {
    if log.topics.len() != 4 {
        return Err(DecodeError::TopicCount {
            event,
            expected: 4,
            actual: log.topics.len(),
        });
    }
    if log.data.len() != expected_len {
        return Err(DecodeError::DataLength {
            event,
            expected: expected_len,
            actual: log.data.len(),
        });
    }
    Ok(LiquidityChange {
        block: SwapObservation::block_key(log.block_number, log.transaction_index),
        tick_lower: read_tick_topic(&log.topics[2])?,
        tick_upper: read_tick_topic(&log.topics[3])?,
        liquidity: read_u128(&log.data, offset).map_err(|_| DecodeError::LiquidityOverflow)?,
        amount0: read_u128(&log.data, offset + 32)?,
        amount1: read_u128(&log.data, offset + 64)?,
    })
}

fn word(data: &[u8], offset: usize) -> [u8; 32] {
    let mut w = [0u8; 32];
    w.copy_from_slice(&data[offset..offset + 32]);
    w
}

/// Narrows a two's-complement int256 word to i128, requiring the upper
/// sixteen bytes to be pure sign extension.
fn read_i128(data: &[u8], offset: usize) -> Result<i128, DecodeError> {
    let w = word(data, offset);
    let mut low = [0u8; 16];
    low.copy_from_slice(&w[16..]);
    let value = i128::from_be_bytes(low);
    let fill = if value < 0 { 0xff } else { 0x00 };
    if w[..16].iter().all(|b| *b == fill) {
        Ok(value)
    } else {
        Err(DecodeError::AmountOverflow(offset))
    }
}

/// Narrows a uint256 word to u128, requiring zero upper bytes.
fn read_u128(data: &[u8], offset: usize) -> Result<u128, DecodeError> {
    let w = word(data, offset);
    if w[..16].iter().any(|b| *b != 0) {
        return Err(DecodeError::UnsignedOverflow(offset));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&w[16..]);
    Ok(u128::from_be_bytes(low))
}

/// Reads an int24 tick out of an indexed topic, sign-extended to 32 bytes
/// by the ABI encoder.
fn read_tick_topic(topic: &H256) -> Result<i32, DecodeError> {
    let bytes = topic.as_bytes();
    let mut tail = [0u8; 4];
    tail.copy_from_slice(&bytes[28..]);
    let value = i32::from_be_bytes(tail);
    let fill = if value < 0 { 0xff } else { 0x00 };
    if bytes[..28].iter().all(|b| *b == fill) {
        Ok(value)
    } else {
        Err(DecodeError::BadTickTopic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i128_word(value: i128) -> [u8; 32] {
        let mut w = if value < 0 { [0xff; 32] } else { [0u8; 32] };
        w[16..].copy_from_slice(&value.to_be_bytes());
        w
    }

    fn u128_word(value: u128) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[16..].copy_from_slice(&value.to_be_bytes());
        w
    }

    fn tick_topic(tick: i32) -> H256 {
        let mut bytes = if tick < 0 { [0xff; 32] } else { [0u8; 32] };
        bytes[28..].copy_from_slice(&tick.to_be_bytes());
        H256(bytes)
    }

    fn swap_log(
        block_number: u64,
        tx_index: u64,
        amount0: i128,
        amount1: i128,
        sqrt_price_x96: U256,
        liquidity: u128,
    ) -> RawLog {
        let mut data = Vec::with_capacity(128);
        data.extend_from_slice(&i128_word(amount0));
        data.extend_from_slice(&i128_word(amount1));
        data.extend_from_slice(&sqrt_price_x96.to_big_endian());
        data.extend_from_slice(&u128_word(liquidity));
        RawLog {
            block_number,
            transaction_index: tx_index,
            transaction_hash: H256::zero(),
            topics: vec![SWAP_TOPIC, H256::zero(), H256::zero()],
            data,
        }
    }

    #[test]
    fn test_decode_swap_round_trip() {
        let x96 = U256::from(1u8) << 96;
        let log = swap_log(
            117_219_808,
            42,
            -500_000_000_000_000_000,
            1_650_000_000,
            x96,
            88_421_337_000_000,
        );

        let event = decode_event(&log).unwrap();
        let swap = event.as_swap().unwrap();
        assert_eq!(swap.block, 117_219_808_042);
        assert_eq!(swap.amount0, -500_000_000_000_000_000);
        assert_eq!(swap.amount1, 1_650_000_000);
        assert_eq!(swap.sqrt_price_x96, x96);
        assert_eq!(swap.liquidity, 88_421_337_000_000);
    }

    #[test]
    fn test_decode_swap_accepts_trailing_tick_word() {
        let mut log = swap_log(100, 0, 1, -1, U256::from(1u8) << 96, 5);
        log.data.extend_from_slice(&i128_word(12_000));
        assert_eq!(log.data.len(), 160);

        let event = decode_event(&log).unwrap();
        assert!(event.as_swap().is_some());
    }

    #[test]
    fn test_decode_swap_rejects_wrong_length() {
        let mut log = swap_log(100, 0, 1, -1, U256::from(1u8) << 96, 5);
        log.data.truncate(100);

        let err = decode_event(&log).unwrap_err();
        assert_eq!(
            err,
            DecodeError::DataLength {
                event: "Swap",
                expected: 128,
                actual: 100,
            }
        );
    }

    #[test]
    fn test_decode_swap_rejects_amount_overflow() {
        let mut log = swap_log(100, 0, 1, -1, U256::from(1u8) << 96, 5);
        // Positive value with a dirty high half is not valid sign extension.
        log.data[3] = 0x01;

        assert_eq!(
            decode_event(&log).unwrap_err(),
            DecodeError::AmountOverflow(0)
        );
    }

    #[test]
    fn test_decode_swap_rejects_oversized_sqrt_price() {
        let log = swap_log(100, 0, 1, -1, U256::from(1u8) << 160, 5);
        assert_eq!(
            decode_event(&log).unwrap_err(),
            DecodeError::SqrtPriceOverflow
        );
    }

    #[test]
    fn test_decode_swap_rejects_oversized_liquidity() {
        let mut log = swap_log(100, 0, 1, -1, U256::from(1u8) << 96, 5);
        // Dirty high half of the liquidity word.
        log.data[96] = 0x01;

        assert_eq!(
            decode_event(&log).unwrap_err(),
            DecodeError::LiquidityOverflow
        );
    }

    #[test]
    fn test_decode_mint_with_negative_bounds() {
        let mut data = Vec::with_capacity(128);
        data.extend_from_slice(&u128_word(7)); // sender word, ignored content
        data.extend_from_slice(&u128_word(1_000_000));
        data.extend_from_slice(&u128_word(500));
        data.extend_from_slice(&u128_word(600));
        let log = RawLog {
            block_number: 9,
            transaction_index: 3,
            transaction_hash: H256::zero(),
            topics: vec![MINT_TOPIC, H256::zero(), tick_topic(-887_220), tick_topic(-100)],
            data,
        };

        let event = decode_event(&log).unwrap();
        let PoolEvent::Mint(change) = event else {
            panic!("expected mint");
        };
        assert_eq!(change.block, 9_003);
        assert_eq!(change.tick_lower, -887_220);
        assert_eq!(change.tick_upper, -100);
        assert_eq!(change.liquidity, 1_000_000);
        assert_eq!(change.amount0, 500);
        assert_eq!(change.amount1, 600);
    }

    #[test]
    fn test_decode_burn() {
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&u128_word(250_000));
        data.extend_from_slice(&u128_word(10));
        data.extend_from_slice(&u128_word(20));
        let log = RawLog {
            block_number: 11,
            transaction_index: 0,
            transaction_hash: H256::zero(),
            topics: vec![BURN_TOPIC, H256::zero(), tick_topic(10_000), tick_topic(14_000)],
            data,
        };

        let event = decode_event(&log).unwrap();
        let PoolEvent::Burn(change) = event else {
            panic!("expected burn");
        };
        assert_eq!(change.liquidity, 250_000);
        assert_eq!(change.tick_lower, 10_000);
        assert_eq!(change.tick_upper, 14_000);
    }

    #[test]
    fn test_decode_mint_rejects_missing_bound_topics() {
        let log = RawLog {
            block_number: 9,
            transaction_index: 3,
            transaction_hash: H256::zero(),
            topics: vec![MINT_TOPIC, H256::zero()],
            data: vec![0; 128],
        };

        assert_eq!(
            decode_event(&log).unwrap_err(),
            DecodeError::TopicCount {
                event: "Mint",
                expected: 4,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_decode_rejects_corrupt_tick_topic() {
        let mut topic = tick_topic(500);
        topic.0[0] = 0x01;
        let log = RawLog {
            block_number: 9,
            transaction_index: 0,
            transaction_hash: H256::zero(),
            topics: vec![BURN_TOPIC, H256::zero(), topic, tick_topic(600)],
            data: vec![0; 96],
        };

        assert_eq!(decode_event(&log).unwrap_err(), DecodeError::BadTickTopic);
    }

    #[test]
    fn test_decode_rejects_unknown_topic() {
        let log = RawLog {
            block_number: 1,
            transaction_index: 0,
            transaction_hash: H256::zero(),
            topics: vec![H256::repeat_byte(0xab)],
            data: Vec::new(),
        };

        assert!(matches!(
            decode_event(&log).unwrap_err(),
            DecodeError::UnknownTopic(_)
        ));
    }
}

//! Helper utilities and common functions

use crate::common::constants::{BLOCK_SIZE, BLOCK_SIZE_IN_UNITS_OF_PACK_SIZE, MAX_BIT_WIDTH};
use crate::common::error::{CodecError, CodecResult};

/// Returns the number of bits needed to represent `value` (0 for 0)
#[inline]
pub fn bits(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Returns the number of packed words one block occupies at `bit_width`
#[inline]
pub fn packed_words_per_block(bit_width: u32) -> usize {
    BLOCK_SIZE_IN_UNITS_OF_PACK_SIZE * bit_width as usize
}

/// Returns the number of blocks needed to hold `len` values
#[inline]
pub fn block_count(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE)
}

/// Returns the exclusive upper bound of values storable at `bit_width`,
/// which is also the longest hop an exception gap code can express
#[inline]
pub fn max_gap(bit_width: u32) -> u64 {
    1u64 << bit_width
}

/// Validates a bit width
pub fn check_bit_width(bit_width: u32) -> CodecResult<()> {
    if bit_width > MAX_BIT_WIDTH {
        return Err(CodecError::InvalidBitWidth(bit_width));
    }
    Ok(())
}

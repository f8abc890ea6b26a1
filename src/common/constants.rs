//! Constants used throughout the codec

/// Number of values handled by one call of the bit-packing primitive
pub const PACK_SIZE: usize = 32;

/// Number of pack groups per block
pub const BLOCK_SIZE_IN_UNITS_OF_PACK_SIZE: usize = 4;

/// Number of values in one block
pub const BLOCK_SIZE: usize = BLOCK_SIZE_IN_UNITS_OF_PACK_SIZE * PACK_SIZE;

/// Bits needed to store a first-exception position (0..=BLOCK_SIZE)
pub const BLOCK_SIZE_IN_BITS: u32 = usize::BITS - BLOCK_SIZE.leading_zeros();

/// Mask selecting the first-exception field of a block header
pub const FIRST_EXCEPTION_MASK: u32 = (1 << BLOCK_SIZE_IN_BITS) - 1;

/// Largest number of values in one chunk. One header bit is kept in reserve.
pub const MAX_CHUNK_LEN: usize = 1 << (32 - BLOCK_SIZE_IN_BITS - 1);

/// Default number of values sampled by the bit-width selector
pub const DEFAULT_SAMPLE_SIZE: usize = 64 * 1024;

/// Widest supported bit width
pub const MAX_BIT_WIDTH: u32 = 32;

/// Words written before the chunks: the total value count
pub const ARRAY_HEADER_WORDS: usize = 1;

/// Words written at the start of each chunk: length and bit width
pub const CHUNK_HEADER_WORDS: usize = 2;

/// Human-readable codec name
pub const CODEC_NAME: &str = "PFor";

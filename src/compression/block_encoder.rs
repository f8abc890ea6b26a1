/// PFor block encoder
///
/// Compresses one block of `BLOCK_SIZE` values at a fixed bit width `b`.
/// Values `>= 2^b` are exceptions: their raw values go to the exception
/// list and their slots are reused to store a gap code, the distance minus
/// one to the next exception of the block. Together with the first
/// exception position kept in the block header, the gap codes form a chain
/// the decoder walks to patch the raw values back in.
///
/// A gap code can express at most `2^b - 1`. When two exceptions lie
/// farther apart, compulsory exceptions are inserted every `2^b` slots: the
/// value stored there goes to the exception list even though it fits, and
/// its slot becomes another link of the chain.
use crate::common::constants::{BLOCK_SIZE, MAX_BIT_WIDTH};
use crate::common::error::{ensure_capacity, CodecError, CodecResult};
use crate::common::helper::{check_bit_width, max_gap, packed_words_per_block};
use crate::compression::bitpacking::pack_block;
use crate::compression::types::{BlockPatch, ChainLink};

/// Block encoder with reusable scratch buffers
///
/// Not reentrant: each encoding thread needs its own instance.
#[derive(Debug, Clone)]
pub struct BlockEncoder {
    /// Copy of the block with gap codes written over exception slots
    coded_copy: Vec<u32>,

    /// Positions of the values that do not fit the bit width
    exception_positions: Vec<usize>,

    /// Exception chain of the block being encoded
    chain: Vec<ChainLink>,
}

impl BlockEncoder {
    /// Creates a new block encoder
    pub fn new() -> Self {
        Self {
            coded_copy: vec![0; BLOCK_SIZE],
            exception_positions: Vec::with_capacity(BLOCK_SIZE),
            chain: Vec::with_capacity(BLOCK_SIZE),
        }
    }

    /// Encodes one block
    ///
    /// # Arguments
    /// * `block` - Exactly `BLOCK_SIZE` values
    /// * `bit_width` - Width to pack at (0-32)
    /// * `output` - Receives `4 * bit_width` packed words
    /// * `exceptions` - Exception list, appended to in block order
    ///
    /// # Returns
    /// First exception position (`BLOCK_SIZE` when none) and exception counts
    pub fn encode_block(
        &mut self,
        block: &[u32],
        bit_width: u32,
        output: &mut [u32],
        exceptions: &mut Vec<u32>,
    ) -> CodecResult<BlockPatch> {
        if block.len() != BLOCK_SIZE {
            return Err(CodecError::InvalidLength {
                expected: BLOCK_SIZE,
                actual: block.len(),
            });
        }
        check_bit_width(bit_width)?;
        let words = packed_words_per_block(bit_width);
        ensure_capacity(words, output.len())?;
        let output = &mut output[..words];

        if bit_width == MAX_BIT_WIDTH {
            output.copy_from_slice(block);
            return Ok(BlockPatch::unpatched());
        }

        find_exceptions(block, bit_width, &mut self.exception_positions);
        if self.exception_positions.is_empty() {
            pack_block(block, output, bit_width);
            return Ok(BlockPatch::unpatched());
        }

        build_chain(block, bit_width, &self.exception_positions, &mut self.chain);

        self.coded_copy.copy_from_slice(block);
        lower_chain(&self.chain, &mut self.coded_copy);
        exceptions.extend(self.chain.iter().map(|link| link.value));
        pack_block(&self.coded_copy, output, bit_width);

        Ok(BlockPatch {
            first_exception: self.chain[0].position,
            exceptions: self.chain.len(),
            compulsory: self.chain.iter().filter(|link| link.compulsory).count(),
        })
    }
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the exception chain of `block` at `bit_width`
///
/// Empty when every value fits. At width 32 nothing can be an exception.
pub fn exception_chain(block: &[u32], bit_width: u32) -> CodecResult<Vec<ChainLink>> {
    if block.len() != BLOCK_SIZE {
        return Err(CodecError::InvalidLength {
            expected: BLOCK_SIZE,
            actual: block.len(),
        });
    }
    check_bit_width(bit_width)?;

    let mut positions = Vec::new();
    let mut chain = Vec::new();
    find_exceptions(block, bit_width, &mut positions);
    build_chain(block, bit_width, &positions, &mut chain);
    Ok(chain)
}

fn find_exceptions(block: &[u32], bit_width: u32, positions: &mut Vec<usize>) {
    positions.clear();
    let limit = max_gap(bit_width);
    positions.extend(
        block
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value as u64 >= limit)
            .map(|(position, _)| position),
    );
}

fn build_chain(block: &[u32], bit_width: u32, positions: &[usize], chain: &mut Vec<ChainLink>) {
    chain.clear();
    let Some((&first, rest)) = positions.split_first() else {
        return;
    };

    chain.push(ChainLink {
        position: first,
        value: block[first],
        compulsory: false,
    });

    // No gap inside a block can reach 2^b once 2^b >= BLOCK_SIZE
    let hop = max_gap(bit_width);
    let saturates = hop < BLOCK_SIZE as u64;
    let hop = hop as usize;

    let mut prev = first;
    for &cur in rest {
        if saturates {
            while cur - prev > hop {
                let mid = prev + hop;
                chain.push(ChainLink {
                    position: mid,
                    value: block[mid],
                    compulsory: true,
                });
                prev = mid;
            }
        }
        chain.push(ChainLink {
            position: cur,
            value: block[cur],
            compulsory: false,
        });
        prev = cur;
    }
}

/// Writes each link's gap code over its slot. The last link keeps its value.
fn lower_chain(chain: &[ChainLink], coded: &mut [u32]) {
    for pair in chain.windows(2) {
        coded[pair[0].position] = (pair[1].position - pair[0].position - 1) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::bitpacking::unpack_block;

    fn encode(block: &[u32], bit_width: u32) -> (Vec<u32>, Vec<u32>, BlockPatch) {
        let mut encoder = BlockEncoder::new();
        let mut packed = vec![0u32; packed_words_per_block(bit_width)];
        let mut exceptions = Vec::new();
        let patch = encoder
            .encode_block(block, bit_width, &mut packed, &mut exceptions)
            .unwrap();
        (packed, exceptions, patch)
    }

    fn unpacked(packed: &[u32], bit_width: u32) -> Vec<u32> {
        let mut slots = vec![0u32; BLOCK_SIZE];
        unpack_block(packed, &mut slots, bit_width);
        slots
    }

    #[test]
    fn test_full_width_copies_block() {
        let block: Vec<u32> = (0..BLOCK_SIZE as u32).map(|i| u32::MAX - i).collect();
        let (packed, exceptions, patch) = encode(&block, 32);
        assert_eq!(packed, block);
        assert!(exceptions.is_empty());
        assert_eq!(patch, BlockPatch::unpatched());
    }

    #[test]
    fn test_block_without_exceptions() {
        let block: Vec<u32> = (0..BLOCK_SIZE as u32).map(|i| i % 32).collect();
        let (packed, exceptions, patch) = encode(&block, 5);
        assert_eq!(packed.len(), 20);
        assert!(exceptions.is_empty());
        assert_eq!(patch.first_exception, BLOCK_SIZE);
        assert_eq!(unpacked(&packed, 5), block);
    }

    #[test]
    fn test_single_outlier() {
        let mut block = vec![0u32; BLOCK_SIZE];
        block[77] = u32::MAX;
        let (packed, exceptions, patch) = encode(&block, 4);

        assert_eq!(patch.first_exception, 77);
        assert_eq!(patch.exceptions, 1);
        assert_eq!(patch.compulsory, 0);
        assert_eq!(exceptions, vec![u32::MAX]);

        let slots = unpacked(&packed, 4);
        for (position, &slot) in slots.iter().enumerate() {
            if position != 77 {
                assert_eq!(slot, 0);
            }
        }
    }

    #[test]
    fn test_gap_codes_link_exceptions() {
        let mut block = vec![1u32; BLOCK_SIZE];
        block[3] = 500;
        block[10] = 600;
        block[11] = 700;
        let (packed, exceptions, patch) = encode(&block, 4);

        assert_eq!(patch.first_exception, 3);
        assert_eq!(exceptions, vec![500, 600, 700]);

        let slots = unpacked(&packed, 4);
        assert_eq!(slots[3], 6);
        assert_eq!(slots[10], 0);
    }

    #[test]
    fn test_compulsory_exceptions() {
        let mut block: Vec<u32> = (0..BLOCK_SIZE as u32).map(|i| i % 4).collect();
        block[1] = 1000;
        block[12] = 2000;
        let (packed, exceptions, patch) = encode(&block, 2);

        // Hops of at most 4: 1 -> 5 -> 9 -> 12
        assert_eq!(patch.first_exception, 1);
        assert_eq!(patch.exceptions, 4);
        assert_eq!(patch.compulsory, 2);
        assert_eq!(exceptions, vec![1000, block[5], block[9], 2000]);

        let slots = unpacked(&packed, 2);
        assert_eq!(slots[1], 3);
        assert_eq!(slots[5], 3);
        assert_eq!(slots[9], 2);
    }

    #[test]
    fn test_no_saturation_at_wide_widths() {
        let mut block = vec![5u32; BLOCK_SIZE];
        block[0] = 1 << 20;
        block[127] = 1 << 21;
        let chain = exception_chain(&block, 7).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|link| !link.compulsory));

        let (packed, _, _) = encode(&block, 7);
        assert_eq!(unpacked(&packed, 7)[0], 126);
    }

    #[test]
    fn test_zero_width_chain() {
        let mut block = vec![0u32; BLOCK_SIZE];
        block[2] = 9;
        block[6] = 8;
        let chain = exception_chain(&block, 0).unwrap();
        let positions: Vec<usize> = chain.iter().map(|link| link.position).collect();
        assert_eq!(positions, vec![2, 3, 4, 5, 6]);
        assert_eq!(chain.iter().filter(|link| link.compulsory).count(), 3);
    }

    #[test]
    fn test_encode_block_errors() {
        let mut encoder = BlockEncoder::new();
        let mut exceptions = Vec::new();
        let mut packed = vec![0u32; 128];

        let short = vec![0u32; 100];
        assert_eq!(
            encoder.encode_block(&short, 4, &mut packed, &mut exceptions),
            Err(CodecError::InvalidLength {
                expected: BLOCK_SIZE,
                actual: 100
            })
        );

        let block = vec![0u32; BLOCK_SIZE];
        assert_eq!(
            encoder.encode_block(&block, 33, &mut packed, &mut exceptions),
            Err(CodecError::InvalidBitWidth(33))
        );

        let mut tiny = vec![0u32; 3];
        assert_eq!(
            encoder.encode_block(&block, 4, &mut tiny, &mut exceptions),
            Err(CodecError::BufferTooSmall {
                required: 16,
                available: 3
            })
        );
    }
}

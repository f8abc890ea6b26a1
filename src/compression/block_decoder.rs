/// PFor block decoder
///
/// Unpacks a block at its bit width, then walks the exception chain from the
/// header's first exception position. Each visited slot holds the gap code
/// to the next link; it is replaced by the next raw value from the exception
/// list. The walk ends when the list cursor reaches the cumulative index
/// recorded in the header.
///
/// Headers and chains are validated against the exception list so corrupt
/// input fails with `CorruptHeader`/`CorruptData` instead of reading out of
/// bounds.
use crate::common::constants::BLOCK_SIZE;
use crate::common::error::{CodecError, CodecResult};
use crate::common::helper::{check_bit_width, packed_words_per_block};
use crate::compression::bitpacking::unpack_block;
use crate::compression::types::BlockHeader;
use crate::{corrupt_data, corrupt_header};

/// Bounded cursor over a chunk's exception list
#[derive(Debug, Clone)]
pub struct ExceptionReader<'a> {
    values: &'a [u32],
    position: usize,
}

impl<'a> ExceptionReader<'a> {
    /// Creates a reader positioned at the first exception
    pub fn new(values: &'a [u32]) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Number of exception values consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Checks that `end` is a valid bound for the next block
    fn check_end(&self, end: usize) -> CodecResult<()> {
        if end > self.values.len() {
            return Err(corrupt_header!(
                "exception index {} past the {} available exception values",
                end,
                self.values.len()
            ));
        }
        if end < self.position {
            return Err(corrupt_header!(
                "exception index {} behind cursor {}",
                end,
                self.position
            ));
        }
        Ok(())
    }
}

/// Decodes one block in place
///
/// # Arguments
/// * `packed` - At least `4 * bit_width` packed words
/// * `bit_width` - Width the block was packed at
/// * `header` - Block header holding the first exception and the exception bound
/// * `exceptions` - Cursor into the chunk's exception list
/// * `output` - Exactly `BLOCK_SIZE` slots
pub fn decode_block(
    packed: &[u32],
    bit_width: u32,
    header: BlockHeader,
    exceptions: &mut ExceptionReader<'_>,
    output: &mut [u32],
) -> CodecResult<()> {
    if output.len() != BLOCK_SIZE {
        return Err(CodecError::InvalidLength {
            expected: BLOCK_SIZE,
            actual: output.len(),
        });
    }
    check_bit_width(bit_width)?;

    let words = packed_words_per_block(bit_width);
    if packed.len() < words {
        return Err(corrupt_data!(
            "block needs {} packed words, {} available",
            words,
            packed.len()
        ));
    }
    unpack_block(&packed[..words], output, bit_width);

    let end = header.exception_end;
    exceptions.check_end(end)?;

    if header.first_exception > BLOCK_SIZE {
        return Err(corrupt_header!(
            "first exception position {} outside the block",
            header.first_exception
        ));
    }
    if !header.has_exceptions() {
        if end != exceptions.position {
            return Err(corrupt_header!(
                "block without exceptions claims {} exception values",
                end - exceptions.position
            ));
        }
        return Ok(());
    }
    if end == exceptions.position {
        return Err(corrupt_header!(
            "block has first exception at {} but no exception values",
            header.first_exception
        ));
    }

    let mut cur = header.first_exception;
    while exceptions.position < end {
        if cur >= BLOCK_SIZE {
            return Err(corrupt_data!(
                "exception chain leaves the block at position {} with {} values left",
                cur,
                end - exceptions.position
            ));
        }
        let next = cur.saturating_add(output[cur] as usize).saturating_add(1);
        output[cur] = exceptions.values[exceptions.position];
        exceptions.position += 1;
        cur = next;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::block_encoder::BlockEncoder;

    fn roundtrip(block: &[u32], bit_width: u32) -> Vec<u32> {
        let mut encoder = BlockEncoder::new();
        let mut packed = vec![0u32; packed_words_per_block(bit_width)];
        let mut exceptions = Vec::new();
        let patch = encoder
            .encode_block(block, bit_width, &mut packed, &mut exceptions)
            .unwrap();

        let header = BlockHeader::new(patch.first_exception, exceptions.len());
        let mut reader = ExceptionReader::new(&exceptions);
        let mut output = vec![0u32; BLOCK_SIZE];
        decode_block(&packed, bit_width, header, &mut reader, &mut output).unwrap();
        assert_eq!(reader.position(), exceptions.len());
        output
    }

    #[test]
    fn test_roundtrip_every_width() {
        let block: Vec<u32> = (0..BLOCK_SIZE as u32)
            .map(|i| i.wrapping_mul(0x9E37_79B9) >> (i % 32))
            .collect();
        for bit_width in 0..=32 {
            assert_eq!(roundtrip(&block, bit_width), block, "bit width {}", bit_width);
        }
    }

    #[test]
    fn test_single_outlier() {
        for position in [0, 1, 63, 127] {
            let mut block = vec![0u32; BLOCK_SIZE];
            block[position] = u32::MAX;
            assert_eq!(roundtrip(&block, 4), block);
        }
    }

    #[test]
    fn test_compulsory_chain() {
        let mut block: Vec<u32> = (0..BLOCK_SIZE as u32).map(|i| i % 8).collect();
        block[0] = 100_000;
        block[127] = 200_000;
        assert_eq!(roundtrip(&block, 3), block);
    }

    #[test]
    fn test_no_exception_header() {
        let block = vec![3u32; BLOCK_SIZE];
        let mut packed = vec![0u32; 8];
        crate::compression::bitpacking::pack_block(&block, &mut packed, 2);

        let mut reader = ExceptionReader::new(&[]);
        let mut output = vec![0u32; BLOCK_SIZE];
        decode_block(
            &packed,
            2,
            BlockHeader::new(BLOCK_SIZE, 0),
            &mut reader,
            &mut output,
        )
        .unwrap();
        assert_eq!(output, block);
    }

    #[test]
    fn test_rejects_bound_past_exception_list() {
        let packed = vec![0u32; 8];
        let exceptions = [7u32];
        let mut reader = ExceptionReader::new(&exceptions);
        let mut output = vec![0u32; BLOCK_SIZE];
        let err = decode_block(&packed, 2, BlockHeader::new(0, 2), &mut reader, &mut output)
            .unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader(_)));
    }

    #[test]
    fn test_rejects_inconsistent_empty_block() {
        let packed = vec![0u32; 8];
        let exceptions = [7u32];
        let mut reader = ExceptionReader::new(&exceptions);
        let mut output = vec![0u32; BLOCK_SIZE];
        let err = decode_block(
            &packed,
            2,
            BlockHeader::new(BLOCK_SIZE, 1),
            &mut reader,
            &mut output,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader(_)));
    }

    #[test]
    fn test_rejects_chain_leaving_block() {
        // Gap code 3 at the last slot jumps past the end with values left
        let mut slots = vec![0u32; BLOCK_SIZE];
        slots[127] = 3;
        let mut packed = vec![0u32; 8];
        crate::compression::bitpacking::pack_block(&slots, &mut packed, 2);

        let exceptions = [10u32, 20];
        let mut reader = ExceptionReader::new(&exceptions);
        let mut output = vec![0u32; BLOCK_SIZE];
        let err = decode_block(&packed, 2, BlockHeader::new(127, 2), &mut reader, &mut output)
            .unwrap_err();
        assert!(matches!(err, CodecError::CorruptData(_)));
    }

    #[test]
    fn test_rejects_truncated_packed_words() {
        let packed = vec![0u32; 5];
        let mut reader = ExceptionReader::new(&[]);
        let mut output = vec![0u32; BLOCK_SIZE];
        let err = decode_block(
            &packed,
            4,
            BlockHeader::new(BLOCK_SIZE, 0),
            &mut reader,
            &mut output,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::CorruptData(_)));
    }
}

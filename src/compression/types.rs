/// Types shared by the PFor encoder, decoder and array driver
///
/// Everything here is a plain value type; the word-level layout of headers
/// lives in `pack`/`unpack` methods so the algorithms can work with named
/// fields.
use crate::common::constants::{BLOCK_SIZE, BLOCK_SIZE_IN_BITS, FIRST_EXCEPTION_MASK};
use crate::compression::traits::CompressionStats;
use serde::{Deserialize, Serialize};

/// Block header word
///
/// Low `BLOCK_SIZE_IN_BITS` bits: position of the block's first exception
/// (`BLOCK_SIZE` when the block has none). High bits: index into the chunk's
/// exception list reached after this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Position of the first exception, or `BLOCK_SIZE`
    pub first_exception: usize,

    /// Cumulative exception count through this block
    pub exception_end: usize,
}

impl BlockHeader {
    /// Creates a new block header
    pub fn new(first_exception: usize, exception_end: usize) -> Self {
        Self {
            first_exception,
            exception_end,
        }
    }

    /// Returns whether the block carries any exception
    pub fn has_exceptions(&self) -> bool {
        self.first_exception != BLOCK_SIZE
    }

    /// Packs the header into one word
    pub fn pack(&self) -> u32 {
        debug_assert!(self.first_exception <= BLOCK_SIZE);
        debug_assert!(self.exception_end < 1 << (32 - BLOCK_SIZE_IN_BITS));
        (self.first_exception as u32 & FIRST_EXCEPTION_MASK)
            | ((self.exception_end as u32) << BLOCK_SIZE_IN_BITS)
    }

    /// Unpacks a header word
    pub fn unpack(word: u32) -> Self {
        Self {
            first_exception: (word & FIRST_EXCEPTION_MASK) as usize,
            exception_end: (word >> BLOCK_SIZE_IN_BITS) as usize,
        }
    }
}

/// Chunk header: the two words preceding a chunk's blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Number of values in the chunk
    pub len: usize,

    /// Bit width shared by every block of the chunk
    pub bit_width: u32,
}

/// One link of a block's exception chain
///
/// The chain is first built as explicit `(position, value)` links and only
/// then lowered into in-place gap codes by the block encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    /// Position inside the block
    pub position: usize,

    /// Raw value stored at `position`, appended to the exception list
    pub value: u32,

    /// Whether the link only exists because the previous gap was too long
    pub compulsory: bool,
}

/// Summary of one encoded block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPatch {
    /// Position of the first exception, or `BLOCK_SIZE`
    pub first_exception: usize,

    /// Number of values appended to the exception list
    pub exceptions: usize,

    /// How many of those were compulsory
    pub compulsory: usize,
}

impl BlockPatch {
    /// Patch of a block without exceptions
    pub fn unpatched() -> Self {
        Self {
            first_exception: BLOCK_SIZE,
            exceptions: 0,
            compulsory: 0,
        }
    }
}

/// Result of decoding a compressed array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedArray {
    /// Number of values written to the output
    pub values: usize,

    /// Number of input words consumed
    pub consumed: usize,
}

/// Result of bit-width analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    /// Selected bit width
    pub bit_width: u32,

    /// Estimated bits per value at `bit_width`, exception overhead included
    pub estimated_bits_per_value: f64,

    /// Estimated exception rate, compulsory exceptions included
    pub exception_rate: f64,

    /// Number of values the estimate is based on
    pub sample_size: usize,

    /// Estimated compression ratio (32 / estimated bits per value); `None`
    /// when the values cost no packed bits at all
    pub compression_ratio: Option<f64>,
}

impl AnalyzeResult {
    /// Creates a new analyze result
    pub fn new(
        bit_width: u32,
        estimated_bits_per_value: f64,
        exception_rate: f64,
        sample_size: usize,
    ) -> Self {
        let compression_ratio =
            (estimated_bits_per_value > 0.0).then(|| 32.0 / estimated_bits_per_value);

        Self {
            bit_width,
            estimated_bits_per_value,
            exception_rate,
            sample_size,
            compression_ratio,
        }
    }

    /// Returns whether packing is estimated to beat raw storage
    pub fn is_beneficial(&self) -> bool {
        self.compression_ratio.map_or(true, |ratio| ratio > 1.0)
    }
}

/// Statistics gathered while encoding an array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeStats {
    /// Number of input values
    pub values: usize,

    /// Number of output words
    pub words: usize,

    /// Number of chunks written
    pub chunks: usize,

    /// Number of blocks written
    pub blocks: usize,

    /// Number of exception values written, compulsory ones included
    pub exceptions: usize,

    /// Number of compulsory exceptions
    pub compulsory_exceptions: usize,

    /// Bit width selected for each chunk
    pub bit_widths: Vec<u32>,
}

impl CompressionStats for EncodeStats {
    fn input_values(&self) -> usize {
        self.values
    }

    fn output_words(&self) -> usize {
        self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_header_layout() {
        let header = BlockHeader::new(17, 3);
        assert_eq!(header.pack(), 17 | (3 << 8));
        assert_eq!(BlockHeader::unpack(header.pack()), header);
        assert!(header.has_exceptions());

        let empty = BlockHeader::new(BLOCK_SIZE, 3);
        assert_eq!(empty.pack() & 0xFF, 128);
        assert!(!BlockHeader::unpack(empty.pack()).has_exceptions());
    }

    #[test]
    fn test_block_header_large_exception_index() {
        let header = BlockHeader::new(0, (1 << 23) + 5);
        assert_eq!(BlockHeader::unpack(header.pack()), header);
    }

    #[test]
    fn test_analyze_result() {
        let result = AnalyzeResult::new(8, 8.0, 0.0, 1000);
        assert_eq!(result.compression_ratio, Some(4.0));
        assert!(result.is_beneficial());

        let raw = AnalyzeResult::new(32, 32.0, 0.0, 1000);
        assert_eq!(raw.compression_ratio, Some(1.0));
        assert!(!raw.is_beneficial());

        let zeros = AnalyzeResult::new(0, 0.0, 0.0, 1000);
        assert_eq!(zeros.compression_ratio, None);
        assert!(zeros.is_beneficial());
    }

    #[test]
    fn test_analyze_result_json_roundtrip() {
        // All-zero input costs nothing per value and has no finite ratio
        let zeros = crate::compression::analyze::estimate_at(&[0u32; 256], 0, 65536);
        let json = serde_json::to_string(&zeros).unwrap();
        assert!(json.contains(r#""compression_ratio":null"#));
        assert_eq!(serde_json::from_str::<AnalyzeResult>(&json).unwrap(), zeros);

        let packed = AnalyzeResult::new(8, 8.0, 0.0, 1000);
        let json = serde_json::to_string(&packed).unwrap();
        assert_eq!(serde_json::from_str::<AnalyzeResult>(&json).unwrap(), packed);
    }

    #[test]
    fn test_encode_stats_json_roundtrip() {
        let stats = EncodeStats {
            values: 300,
            words: 90,
            chunks: 1,
            blocks: 3,
            exceptions: 4,
            compulsory_exceptions: 1,
            bit_widths: vec![6],
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(serde_json::from_str::<EncodeStats>(&json).unwrap(), stats);
    }

    #[test]
    fn test_encode_stats_ratio() {
        let stats = EncodeStats {
            values: 1024,
            words: 128,
            ..Default::default()
        };
        assert_eq!(stats.compression_ratio(), 8.0);
        assert_eq!(stats.bits_per_value(), 4.0);

        let empty = EncodeStats::default();
        assert_eq!(empty.compression_ratio(), 1.0);
        assert_eq!(empty.bits_per_value(), 0.0);
    }
}

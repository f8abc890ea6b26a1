/// PFor array codec
///
/// Array-level driver for Patched Frame-of-Reference compression. The input
/// is split into chunks small enough that the cumulative exception index of
/// every block fits the high bits of its header word; each chunk picks its
/// own bit width and carries its own exception list.
///
/// ## Word layout:
///
/// ```text
/// [total length]
/// chunk*:  [chunk length] [bit width b]
///          { [block header] [4*b packed words] }*
///          [exception values]*
/// ```
///
/// Every chunk but the last holds a multiple of `BLOCK_SIZE` values. The
/// last one may end in a partial block, which is zero-padded before packing;
/// the chunk length records the real count and the decoder drops the padding.
use crate::common::constants::{
    ARRAY_HEADER_WORDS, BLOCK_SIZE, CHUNK_HEADER_WORDS, CODEC_NAME, MAX_BIT_WIDTH, MAX_CHUNK_LEN,
};
use crate::common::error::{ensure_capacity, CodecError, CodecResult};
use crate::common::helper::{block_count, packed_words_per_block};
use crate::compression::analyze::BitWidthSelector;
use crate::compression::block_decoder::{decode_block, ExceptionReader};
use crate::compression::block_encoder::BlockEncoder;
use crate::compression::config::PForConfig;
use crate::compression::traits::IntegerCodec;
use crate::compression::types::{
    AnalyzeResult, BlockHeader, ChunkHeader, DecodedArray, EncodeStats,
};
use crate::{corrupt_data, corrupt_header};
use tracing::{debug, trace};

/// PFor codec
///
/// Owns scratch buffers reused across calls; not reentrant.
#[derive(Debug, Clone)]
pub struct PFor {
    /// Codec configuration
    config: PForConfig,

    /// Per-chunk bit-width selection
    selector: BitWidthSelector,

    /// Block encoder and its scratch buffers
    encoder: BlockEncoder,

    /// Exception list of the chunk being encoded
    exceptions: Vec<u32>,

    /// Zero-padded copy of a trailing partial block
    tail: Vec<u32>,

    /// Statistics of the last encode
    stats: EncodeStats,
}

impl PFor {
    /// Creates a codec with the default configuration
    pub fn new() -> Self {
        Self::build(PForConfig::default())
    }

    /// Creates a codec with a validated configuration
    pub fn with_config(config: PForConfig) -> CodecResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PForConfig) -> Self {
        Self {
            selector: BitWidthSelector::from_config(&config),
            encoder: BlockEncoder::new(),
            exceptions: Vec::new(),
            tail: vec![0; BLOCK_SIZE],
            stats: EncodeStats::default(),
            config,
        }
    }

    /// Returns the configuration
    pub fn config(&self) -> &PForConfig {
        &self.config
    }

    /// Returns the statistics of the last successful encode
    pub fn stats(&self) -> &EncodeStats {
        &self.stats
    }

    /// Estimates the bit width and cost of encoding `values` as one chunk
    pub fn analyze(&mut self, values: &[u32]) -> AnalyzeResult {
        self.selector.analyze(values)
    }

    fn chunk_bit_width(&mut self, chunk: &[u32]) -> u32 {
        match self.config.bit_width {
            Some(bit_width) => bit_width,
            None => self.selector.select(chunk),
        }
    }

    /// Encodes one chunk at the front of `output`, returning the words written
    fn encode_chunk(
        &mut self,
        chunk: &[u32],
        output: &mut [u32],
        stats: &mut EncodeStats,
    ) -> CodecResult<usize> {
        let bit_width = self.chunk_bit_width(chunk);
        let packed_words = packed_words_per_block(bit_width);
        let blocks = block_count(chunk.len());
        let body = CHUNK_HEADER_WORDS + blocks * (1 + packed_words);
        ensure_capacity(body, output.len())?;

        output[0] = chunk.len() as u32;
        output[1] = bit_width;

        let Self {
            encoder,
            exceptions,
            tail,
            ..
        } = self;
        exceptions.clear();

        let mut written = CHUNK_HEADER_WORDS;
        let mut compulsory = 0;
        for (index, values) in chunk.chunks(BLOCK_SIZE).enumerate() {
            let block = if values.len() == BLOCK_SIZE {
                values
            } else {
                tail[..values.len()].copy_from_slice(values);
                tail[values.len()..].fill(0);
                &tail[..]
            };

            let header_at = written;
            written += 1;
            let patch = encoder.encode_block(
                block,
                bit_width,
                &mut output[written..written + packed_words],
                exceptions,
            )?;
            written += packed_words;
            output[header_at] = BlockHeader::new(patch.first_exception, exceptions.len()).pack();

            if patch.exceptions > 0 {
                trace!(
                    block = index,
                    first_exception = patch.first_exception,
                    exceptions = patch.exceptions,
                    compulsory = patch.compulsory,
                    "patched block"
                );
            }
            compulsory += patch.compulsory;
        }

        ensure_capacity(written + exceptions.len(), output.len())?;
        output[written..written + exceptions.len()].copy_from_slice(exceptions);
        written += exceptions.len();

        debug!(
            len = chunk.len(),
            bit_width,
            blocks,
            exceptions = exceptions.len(),
            compulsory,
            words = written,
            "encoded chunk"
        );

        stats.chunks += 1;
        stats.blocks += blocks;
        stats.exceptions += exceptions.len();
        stats.compulsory_exceptions += compulsory;
        stats.bit_widths.push(bit_width);
        Ok(written)
    }

    /// Decodes one chunk from the front of `input` into the front of `output`
    ///
    /// `output` spans the values still missing from the array.
    fn decode_chunk(&mut self, input: &[u32], output: &mut [u32]) -> CodecResult<DecodedArray> {
        if input.len() < CHUNK_HEADER_WORDS {
            return Err(corrupt_header!(
                "truncated chunk header: {} words left",
                input.len()
            ));
        }
        let header = ChunkHeader {
            len: input[0] as usize,
            bit_width: input[1],
        };

        if header.len == 0 || header.len > output.len() || header.len > MAX_CHUNK_LEN {
            return Err(corrupt_header!(
                "chunk length {} invalid with {} values outstanding",
                header.len,
                output.len()
            ));
        }
        if header.len < output.len() && header.len % BLOCK_SIZE != 0 {
            return Err(corrupt_header!(
                "non-final chunk length {} is not a multiple of {}",
                header.len,
                BLOCK_SIZE
            ));
        }
        if header.bit_width > MAX_BIT_WIDTH {
            return Err(corrupt_header!("chunk bit width {}", header.bit_width));
        }

        let packed_words = packed_words_per_block(header.bit_width);
        let blocks = block_count(header.len);
        let body = CHUNK_HEADER_WORDS + blocks * (1 + packed_words);
        if input.len() < body {
            return Err(corrupt_data!(
                "chunk needs {} words, {} available",
                body,
                input.len()
            ));
        }

        let (blocks_region, exception_region) = input.split_at(body);
        let mut reader = ExceptionReader::new(exception_region);
        let mut read = CHUNK_HEADER_WORDS;

        for out_block in output[..header.len].chunks_mut(BLOCK_SIZE) {
            let block_header = BlockHeader::unpack(blocks_region[read]);
            read += 1;
            let packed = &blocks_region[read..read + packed_words];
            read += packed_words;

            if out_block.len() == BLOCK_SIZE {
                decode_block(packed, header.bit_width, block_header, &mut reader, out_block)?;
            } else {
                decode_block(
                    packed,
                    header.bit_width,
                    block_header,
                    &mut reader,
                    &mut self.tail,
                )?;
                let len = out_block.len();
                out_block.copy_from_slice(&self.tail[..len]);
            }
        }

        debug!(
            len = header.len,
            bit_width = header.bit_width,
            exceptions = reader.position(),
            "decoded chunk"
        );

        Ok(DecodedArray {
            values: header.len,
            consumed: body + reader.position(),
        })
    }
}

impl Default for PFor {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerCodec for PFor {
    fn encode_array(&mut self, input: &[u32], output: &mut [u32]) -> CodecResult<usize> {
        if input.len() > u32::MAX as usize {
            return Err(CodecError::InvalidLength {
                expected: u32::MAX as usize,
                actual: input.len(),
            });
        }
        ensure_capacity(ARRAY_HEADER_WORDS, output.len())?;
        output[0] = input.len() as u32;

        let mut stats = EncodeStats {
            values: input.len(),
            ..Default::default()
        };
        let mut written = ARRAY_HEADER_WORDS;
        for chunk in input.chunks(self.config.max_chunk_len) {
            written += self.encode_chunk(chunk, &mut output[written..], &mut stats)?;
        }
        stats.words = written;

        debug!(
            values = stats.values,
            words = stats.words,
            chunks = stats.chunks,
            exceptions = stats.exceptions,
            "encoded array"
        );
        self.stats = stats;
        Ok(written)
    }

    fn decode_array(&mut self, input: &[u32], output: &mut [u32]) -> CodecResult<DecodedArray> {
        let total = self.decoded_len(input)?;
        ensure_capacity(total, output.len())?;

        let mut consumed = ARRAY_HEADER_WORDS;
        let mut decoded = 0;
        while decoded < total {
            let chunk = self.decode_chunk(&input[consumed..], &mut output[decoded..total])?;
            consumed += chunk.consumed;
            decoded += chunk.values;
        }

        debug!(values = decoded, words = consumed, "decoded array");
        Ok(DecodedArray {
            values: decoded,
            consumed,
        })
    }

    fn max_compressed_words(&self, len: usize) -> usize {
        // Worst block: one header, width 31, every slot an exception
        let worst_block = 1 + packed_words_per_block(MAX_BIT_WIDTH - 1) + BLOCK_SIZE;
        let chunks = len.div_ceil(self.config.max_chunk_len);
        ARRAY_HEADER_WORDS + chunks * CHUNK_HEADER_WORDS + block_count(len) * worst_block
    }

    fn decoded_len(&self, input: &[u32]) -> CodecResult<usize> {
        input
            .first()
            .map(|&len| len as usize)
            .ok_or_else(|| corrupt_header!("missing array length word"))
    }

    fn name(&self) -> &'static str {
        CODEC_NAME
    }
}

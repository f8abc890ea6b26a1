/// Integer codec trait
///
/// All integer array codecs implement this trait to provide a uniform
/// interface for encoding and decoding `u32` arrays into `u32` words.
use crate::common::error::{CodecError, CodecResult};
use crate::compression::types::DecodedArray;

/// Integer array codec
///
/// Codecs own reusable scratch state, so every operation takes `&mut self`.
/// Use one instance per thread.
pub trait IntegerCodec: Send {
    /// Encodes `input` into `output`
    ///
    /// # Returns
    /// Number of words written
    fn encode_array(&mut self, input: &[u32], output: &mut [u32]) -> CodecResult<usize>;

    /// Decodes one encoded array from the front of `input` into `output`
    ///
    /// # Returns
    /// Number of values written and number of input words consumed
    fn decode_array(&mut self, input: &[u32], output: &mut [u32]) -> CodecResult<DecodedArray>;

    /// Returns the worst-case encoded size of `len` values, in words
    fn max_compressed_words(&self, len: usize) -> usize;

    /// Returns the number of values stored in an encoded array
    fn decoded_len(&self, input: &[u32]) -> CodecResult<usize>;

    /// Returns the name of this codec
    fn name(&self) -> &'static str;

    /// Encodes `input` into a freshly allocated vector
    fn compress(&mut self, input: &[u32]) -> CodecResult<Vec<u32>> {
        let mut output = vec![0u32; self.max_compressed_words(input.len())];
        let words = self.encode_array(input, &mut output)?;
        output.truncate(words);
        Ok(output)
    }

    /// Decodes `input` into a freshly allocated vector
    fn decompress(&mut self, input: &[u32]) -> CodecResult<Vec<u32>> {
        let len = self.decoded_len(input)?;
        let mut output = vec![0u32; len];
        let decoded = self.decode_array(input, &mut output)?;
        if decoded.values != len {
            return Err(CodecError::InvalidLength {
                expected: len,
                actual: decoded.values,
            });
        }
        Ok(output)
    }
}

/// Size accounting of an encode, in 32-bit units
///
/// Inputs and outputs are both `u32`, so the ratio is a plain count ratio.
pub trait CompressionStats {
    /// Number of values encoded
    fn input_values(&self) -> usize;

    /// Number of words produced, headers and exceptions included
    fn output_words(&self) -> usize;

    /// Input values per output word; 1.0 when nothing was written
    fn compression_ratio(&self) -> f64 {
        match self.output_words() {
            0 => 1.0,
            words => self.input_values() as f64 / words as f64,
        }
    }

    /// Average storage cost of one value in bits
    fn bits_per_value(&self) -> f64 {
        match self.input_values() {
            0 => 0.0,
            values => (self.output_words() * 32) as f64 / values as f64,
        }
    }
}

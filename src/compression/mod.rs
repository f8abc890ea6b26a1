/// Compression module for the PFor codec
///
/// This module implements Patched Frame-of-Reference (PFor) compression for
/// arrays of `u32`, typically delta-encoded posting lists or column values.
///
/// ## Components:
///
/// - **bitpacking**: Fixed-width pack/unpack of 32-value groups
/// - **analyze**: Bit-width selection from a sampled bit-length histogram
/// - **block_encoder**: Packs one block, diverting exceptions to a side list
/// - **block_decoder**: Unpacks one block and walks its exception chain
/// - **pfor**: Array driver handling chunks, headers and size bookkeeping
///
/// ## Usage Example:
///
/// ```ignore
/// use prism_pfor::compression::*;
///
/// let mut codec = PFor::with_config(PForConfig::seeded(7))?;
/// let analysis = codec.analyze(&values);
///
/// if analysis.is_beneficial() {
///     let words = codec.compress(&values)?;
///     let decoded = codec.decompress(&words)?;
/// }
/// ```

pub mod analyze;
pub mod bitpacking;
pub mod block_decoder;
pub mod block_encoder;
pub mod config;
pub mod pfor;
pub mod traits;
pub mod types;

pub use analyze::{estimate_at, select_bit_width_at, BitWidthSelector};
pub use block_decoder::{decode_block, ExceptionReader};
pub use block_encoder::{exception_chain, BlockEncoder};
pub use config::PForConfig;
pub use pfor::PFor;
pub use traits::{CompressionStats, IntegerCodec};
pub use types::{
    AnalyzeResult, BlockHeader, BlockPatch, ChainLink, ChunkHeader, DecodedArray, EncodeStats,
};

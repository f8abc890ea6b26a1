//! prism-pfor - Patched Frame-of-Reference integer compression
//!
//! Bit-packs arrays of `u32` at an adaptively chosen width and patches the
//! values that do not fit back in through an exception list, following the
//! PFor scheme of Zukowski et al. (Super-Scalar RAM-CPU Cache Compression).
//!
//! # Example
//! ```
//! use prism_pfor::{IntegerCodec, PFor};
//!
//! let data: Vec<u32> = (0..1000).map(|i| i % 37).collect();
//! let mut codec = PFor::new();
//! let words = codec.compress(&data).unwrap();
//! assert!(words.len() < data.len());
//! assert_eq!(codec.decompress(&words).unwrap(), data);
//! ```
pub mod common;
pub mod compression;

// Re-export common types for convenience
pub use common::{CodecError, CodecResult, BLOCK_SIZE, MAX_CHUNK_LEN};

// Re-export the codec for convenience
pub use compression::{
    AnalyzeResult, BitWidthSelector, CompressionStats, DecodedArray, EncodeStats, IntegerCodec,
    PFor, PForConfig,
};

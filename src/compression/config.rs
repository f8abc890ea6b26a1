//! Codec configuration
//!
//! Tunables for the PFor codec. The defaults reproduce the reference
//! behavior; the knobs exist so tests and embedding storage engines can pin
//! the sampling offset, force a bit width, or exercise chunking on small
//! inputs.

use crate::common::constants::{BLOCK_SIZE, DEFAULT_SAMPLE_SIZE, MAX_BIT_WIDTH, MAX_CHUNK_LEN};
use crate::common::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};

/// PFor codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PForConfig {
    /// Maximum number of values sampled when selecting a bit width
    pub sample_size: usize,
    /// Maximum number of values per chunk (multiple of the block size)
    pub max_chunk_len: usize,
    /// Seed for the sampling offset (None draws one from the OS)
    pub seed: Option<u64>,
    /// Bit width used for every chunk instead of the selected one
    pub bit_width: Option<u32>,
}

impl PForConfig {
    /// Create a configuration with a reproducible sampling offset
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Create a configuration that skips bit-width selection
    pub fn with_bit_width(bit_width: u32) -> Self {
        Self {
            bit_width: Some(bit_width),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> CodecResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CodecError::InvalidConfig(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against the limits of the word layout
    pub fn validate(&self) -> CodecResult<()> {
        if self.sample_size == 0 {
            return Err(CodecError::InvalidConfig(
                "sample_size must be positive".to_string(),
            ));
        }
        if self.max_chunk_len == 0
            || self.max_chunk_len % BLOCK_SIZE != 0
            || self.max_chunk_len > MAX_CHUNK_LEN
        {
            return Err(CodecError::InvalidConfig(format!(
                "max_chunk_len must be a positive multiple of {} no larger than {}, got {}",
                BLOCK_SIZE, MAX_CHUNK_LEN, self.max_chunk_len
            )));
        }
        if let Some(bit_width) = self.bit_width {
            if bit_width > MAX_BIT_WIDTH {
                return Err(CodecError::InvalidConfig(format!(
                    "bit_width must be at most {}, got {}",
                    MAX_BIT_WIDTH, bit_width
                )));
            }
        }
        Ok(())
    }
}

impl Default for PForConfig {
    fn default() -> Self {
        PForConfig {
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_chunk_len: MAX_CHUNK_LEN,
            seed: None,
            bit_width: None,
        }
    }
}

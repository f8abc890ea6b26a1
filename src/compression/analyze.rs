/// Bit-width selection
///
/// Picks the width `b` that minimizes the estimated cost per value: `b`
/// packed bits plus 32 bits for every exception. The estimate comes from a
/// histogram of bit lengths over a contiguous sample of the input.
///
/// With small widths, gaps between real exceptions often exceed `2^b` and
/// force compulsory exceptions. The exception rate is corrected for those
/// with the estimate `(E * BLOCK_SIZE - 1) / (E * 2^b)` whenever it exceeds
/// the raw rate.
///
/// Widths are scanned from 31 down to 0 and a candidate replaces the best
/// one when its cost is `<=`, so equal costs resolve to the smaller width.
use crate::common::constants::{BLOCK_SIZE, MAX_BIT_WIDTH};
use crate::common::helper::{bits, max_gap};
use crate::compression::config::PForConfig;
use crate::compression::types::AnalyzeResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Estimates the best bit width from the sample starting at `offset`
///
/// The offset is clamped so the sample fits inside `values`. A
/// `sample_size` of 0 samples the whole input.
pub fn estimate_at(values: &[u32], offset: usize, sample_size: usize) -> AnalyzeResult {
    if values.is_empty() {
        return AnalyzeResult::new(0, 0.0, 0.0, 0);
    }

    let sample_len = match sample_size {
        0 => values.len(),
        limit => values.len().min(limit),
    };
    let start = offset.min(values.len() - sample_len);
    let sample = &values[start..start + sample_len];

    let mut freqs = [0usize; MAX_BIT_WIDTH as usize + 1];
    for &value in sample {
        freqs[bits(value) as usize] += 1;
    }

    let mut best_width = MAX_BIT_WIDTH;
    let mut best_cost = MAX_BIT_WIDTH as f64;
    let mut best_rate = 0.0;
    let mut exceptions = 0usize;

    for width in (0..MAX_BIT_WIDTH).rev() {
        exceptions += freqs[width as usize + 1];
        let mut rate = exceptions as f64 / sample_len as f64;

        if exceptions > 0 {
            let with_compulsory =
                (rate * BLOCK_SIZE as f64 - 1.0) / (rate * max_gap(width) as f64);
            if with_compulsory > rate {
                rate = with_compulsory;
            }
        }

        let cost = width as f64 + rate * 32.0;
        if cost <= best_cost {
            best_cost = cost;
            best_width = width;
            best_rate = rate;
        }
    }

    AnalyzeResult::new(best_width, best_cost, best_rate, sample_len)
}

/// Selects the best bit width from the sample starting at `offset`
pub fn select_bit_width_at(values: &[u32], offset: usize, sample_size: usize) -> u32 {
    estimate_at(values, offset, sample_size).bit_width
}

/// Bit-width selector with a seedable sampling offset
#[derive(Debug, Clone)]
pub struct BitWidthSelector {
    /// Maximum number of values sampled, 0 for no limit
    sample_size: usize,

    /// Source of sampling offsets
    rng: StdRng,
}

impl BitWidthSelector {
    /// Creates a selector; without a seed the RNG is seeded from the OS
    pub fn new(sample_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { sample_size, rng }
    }

    /// Creates a selector from a codec configuration
    pub fn from_config(config: &PForConfig) -> Self {
        Self::new(config.sample_size, config.seed)
    }

    /// Draws the start of the next sample for an input of `len` values
    pub fn sample_offset(&mut self, len: usize) -> usize {
        if self.sample_size > 0 && len > self.sample_size {
            self.rng.random_range(0..len - self.sample_size)
        } else {
            0
        }
    }

    /// Estimates the best bit width for `values`
    pub fn analyze(&mut self, values: &[u32]) -> AnalyzeResult {
        let offset = self.sample_offset(values.len());
        estimate_at(values, offset, self.sample_size)
    }

    /// Selects the best bit width for `values`
    pub fn select(&mut self, values: &[u32]) -> u32 {
        self.analyze(values).bit_width
    }
}

impl Default for BitWidthSelector {
    fn default() -> Self {
        Self::from_config(&PForConfig::default())
    }
}

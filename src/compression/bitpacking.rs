/// Fixed-width bit packing
///
/// Packs groups of 32 values at a uniform width `b` into exactly `b` words.
/// Value `i` of a group occupies bits `[i*b, i*b + b)` of the group's bit
/// stream, least significant bits first, spilling into the next word when
/// it crosses a word boundary.
///
/// Values must be `< 2^b`; higher bits are masked off. Callers (the block
/// encoder) patch out every such value before packing.
use crate::common::constants::{BLOCK_SIZE, MAX_BIT_WIDTH, PACK_SIZE};
use crate::common::helper::packed_words_per_block;

#[inline]
fn mask(bit_width: u32) -> u32 {
    if bit_width >= MAX_BIT_WIDTH {
        u32::MAX
    } else {
        (1u32 << bit_width) - 1
    }
}

/// Packs 32 values into `bit_width` words
pub fn pack32(input: &[u32], output: &mut [u32], bit_width: u32) {
    debug_assert_eq!(input.len(), PACK_SIZE);
    debug_assert!(output.len() >= bit_width as usize);

    let width = bit_width as usize;
    if width == 0 {
        return;
    }
    if bit_width == MAX_BIT_WIDTH {
        output[..PACK_SIZE].copy_from_slice(&input[..PACK_SIZE]);
        return;
    }

    let out = &mut output[..width];
    out.fill(0);
    let mask = mask(bit_width);

    for (i, &value) in input.iter().take(PACK_SIZE).enumerate() {
        let value = value & mask;
        let bit_pos = i * width;
        let word = bit_pos / 32;
        let offset = (bit_pos % 32) as u32;

        out[word] |= value << offset;
        if offset + bit_width > 32 {
            out[word + 1] |= value >> (32 - offset);
        }
    }
}

/// Unpacks `bit_width` words into 32 values
pub fn unpack32(input: &[u32], output: &mut [u32], bit_width: u32) {
    debug_assert!(input.len() >= bit_width as usize);
    debug_assert_eq!(output.len(), PACK_SIZE);

    let width = bit_width as usize;
    if width == 0 {
        output[..PACK_SIZE].fill(0);
        return;
    }
    if bit_width == MAX_BIT_WIDTH {
        output[..PACK_SIZE].copy_from_slice(&input[..PACK_SIZE]);
        return;
    }

    let mask = mask(bit_width);
    for (i, slot) in output.iter_mut().take(PACK_SIZE).enumerate() {
        let bit_pos = i * width;
        let word = bit_pos / 32;
        let offset = (bit_pos % 32) as u32;

        let mut value = input[word] >> offset;
        if offset + bit_width > 32 {
            value |= input[word + 1] << (32 - offset);
        }
        *slot = value & mask;
    }
}

/// Packs one block of `BLOCK_SIZE` values into `4 * bit_width` words
pub fn pack_block(input: &[u32], output: &mut [u32], bit_width: u32) {
    debug_assert_eq!(input.len(), BLOCK_SIZE);
    debug_assert!(output.len() >= packed_words_per_block(bit_width));

    let width = bit_width as usize;
    for (group, chunk) in input.chunks_exact(PACK_SIZE).enumerate() {
        pack32(chunk, &mut output[group * width..], bit_width);
    }
}

/// Unpacks `4 * bit_width` words into one block of `BLOCK_SIZE` values
pub fn unpack_block(input: &[u32], output: &mut [u32], bit_width: u32) {
    debug_assert!(input.len() >= packed_words_per_block(bit_width));
    debug_assert_eq!(output.len(), BLOCK_SIZE);

    let width = bit_width as usize;
    for (group, chunk) in output.chunks_exact_mut(PACK_SIZE).enumerate() {
        unpack32(&input[group * width..], chunk, bit_width);
    }
}

//! Capacity planning for carrier images.

use crate::config::DATA_CHANNELS;

/// Raw bit capacity of a grid at the given channel count and bit depth.
pub fn capacity_bits(width: u32, height: u32, channels: usize, depth: u8) -> u64 {
    width as u64 * height as u64 * channels as u64 * depth as u64
}

/// Whole-byte capacity in direct mode (one byte per color channel).
pub fn direct_capacity_bytes(width: u32, height: u32) -> u64 {
    width as u64 * height as u64 * DATA_CHANNELS as u64
}

/// Byte capacity in LSB mode at the given bit depth.
pub fn lsb_capacity_bytes(width: u32, height: u32, depth: u8) -> u64 {
    capacity_bits(width, height, DATA_CHANNELS, depth) / 8
}

/// Whether `required_bytes` fits in the carrier at bit depth `depth`.
pub fn fits(required_bytes: u64, width: u32, height: u32, depth: u8) -> bool {
    required_bytes <= lsb_capacity_bytes(width, height, depth)
}

/// Smallest bit depth in [1, 8] at which `required_bytes` fits, if any.
pub fn min_depth(required_bytes: u64, width: u32, height: u32) -> Option<u8> {
    (1..=8).find(|&depth| fits(required_bytes, width, height, depth))
}

/// Maximum achievable LSB capacity, at depth 8.
///
/// Reported to callers when no depth fits so the error can be precise.
pub fn max_capacity_bytes(width: u32, height: u32) -> u64 {
    lsb_capacity_bytes(width, height, 8)
}

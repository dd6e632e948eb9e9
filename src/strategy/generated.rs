//! Generated-image strategy: whole-byte packing into a fresh square image.

use crate::config::{DATA_CHANNELS, GENERATED_BACKGROUND};
use crate::error::Result;
use crate::pixel::DirectWriter;
use image::{Rgba, RgbaImage};

/// Side length of the square image holding `total_bytes` container bytes.
pub fn image_side(total_bytes: u64) -> u32 {
    let pixels = total_bytes.div_ceil(DATA_CHANNELS as u64).max(1);
    (pixels as f64).sqrt().ceil() as u32
}

/// Allocate a background-filled square image sized for `total_bytes`.
pub fn carrier_for(total_bytes: u64) -> RgbaImage {
    let side = image_side(total_bytes);
    RgbaImage::from_pixel(side, side, Rgba(GENERATED_BACKGROUND))
}

/// Embed a full container byte sequence, header first at offset 0.
pub fn embed(bytes: &[u8]) -> Result<RgbaImage> {
    let mut image = carrier_for(bytes.len() as u64);
    DirectWriter::new(&mut image).write_at(0, bytes)?;
    Ok(image)
}

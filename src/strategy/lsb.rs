//! LSB embedding strategy: bit packing into an existing carrier image.

use crate::error::{Error, Result};
use crate::pixel::{capacity, LsbWriter};
use image::RgbaImage;

/// Embed a full container byte sequence into a copy of `carrier`.
///
/// The capacity check runs before any pixel is touched; failure reports
/// required versus available bytes at the requested depth.
pub fn embed(carrier: &RgbaImage, depth: u8, bytes: &[u8]) -> Result<RgbaImage> {
    if !(1..=8).contains(&depth) {
        return Err(Error::InvalidArgument(format!(
            "bit depth {depth} is outside [1, 8]"
        )));
    }

    let required = bytes.len() as u64;
    let available = capacity::lsb_capacity_bytes(carrier.width(), carrier.height(), depth);
    if required > available {
        return Err(Error::InsufficientCapacity {
            required,
            available,
        });
    }

    let mut output = carrier.clone();
    LsbWriter::new(&mut output, depth).write_at(0, bytes)?;
    Ok(output)
}

//! Byte/bit offset to (row, column, channel) mapping for both modes.

use crate::config::DATA_CHANNELS;
use crate::error::{Error, Result};
use crate::pixel::capacity;
use crate::pixel::ByteSource;
use image::RgbaImage;

/// Map a direct-mode byte index to (row, col, channel).
fn direct_location(byte_index: u64, width: u32) -> (u32, u32, usize) {
    let pixel_index = byte_index / DATA_CHANNELS as u64;
    let channel = (byte_index % DATA_CHANNELS as u64) as usize;
    let row = (pixel_index / width as u64) as u32;
    let col = (pixel_index % width as u64) as u32;
    (row, col, channel)
}

/// Map an LSB-mode bit index to (row, col, channel, bit position).
///
/// Bits of each byte are taken most-significant first. At depth `d` each
/// channel holds `d` consecutive bits, the first in the highest of the `d`
/// low-order bit positions, so depth 1 is exactly the least-significant bit.
fn lsb_location(bit_index: u64, width: u32, depth: u8) -> (u32, u32, usize, u8) {
    let slot = bit_index / depth as u64;
    let pixel_index = slot / DATA_CHANNELS as u64;
    let channel = (slot % DATA_CHANNELS as u64) as usize;
    let row = (pixel_index / width as u64) as u32;
    let col = (pixel_index % width as u64) as u32;
    let bit_pos = depth - 1 - (bit_index % depth as u64) as u8;
    (row, col, channel, bit_pos)
}

fn check_range(offset: u64, len: usize, available: u64) -> Result<()> {
    let needed = offset.saturating_add(len as u64);
    if needed > available {
        return Err(Error::TruncatedContainer { needed, available });
    }
    Ok(())
}

/// Reads whole bytes from channel values.
pub struct DirectReader<'a> {
    image: &'a RgbaImage,
}

impl<'a> DirectReader<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        Self { image }
    }
}

impl ByteSource for DirectReader<'_> {
    fn capacity(&self) -> u64 {
        capacity::direct_capacity_bytes(self.image.width(), self.image.height())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.capacity())?;
        let width = self.image.width();

        for (i, out) in buf.iter_mut().enumerate() {
            let (row, col, channel) = direct_location(offset + i as u64, width);
            *out = self.image.get_pixel(col, row).0[channel];
        }
        Ok(())
    }
}

/// Writes whole bytes into channel values.
pub struct DirectWriter<'a> {
    image: &'a mut RgbaImage,
}

impl<'a> DirectWriter<'a> {
    pub fn new(image: &'a mut RgbaImage) -> Self {
        Self { image }
    }

    pub fn capacity(&self) -> u64 {
        capacity::direct_capacity_bytes(self.image.width(), self.image.height())
    }

    /// Write `bytes` starting at byte `offset`.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        check_range(offset, bytes.len(), self.capacity())?;
        let width = self.image.width();

        for (i, &byte) in bytes.iter().enumerate() {
            let (row, col, channel) = direct_location(offset + i as u64, width);
            self.image.get_pixel_mut(col, row).0[channel] = byte;
        }
        Ok(())
    }
}

/// Reads bytes back out of low-order channel bits.
pub struct LsbReader<'a> {
    image: &'a RgbaImage,
    depth: u8,
}

impl<'a> LsbReader<'a> {
    pub fn new(image: &'a RgbaImage, depth: u8) -> Self {
        debug_assert!((1..=8).contains(&depth));
        Self { image, depth }
    }
}

impl ByteSource for LsbReader<'_> {
    fn capacity(&self) -> u64 {
        capacity::lsb_capacity_bytes(self.image.width(), self.image.height(), self.depth)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.capacity())?;
        let width = self.image.width();

        for (i, out) in buf.iter_mut().enumerate() {
            let mut byte = 0u8;
            for bit in 0..8u64 {
                let bit_index = (offset + i as u64) * 8 + bit;
                let (row, col, channel, bit_pos) = lsb_location(bit_index, width, self.depth);
                let value = (self.image.get_pixel(col, row).0[channel] >> bit_pos) & 1;
                byte = (byte << 1) | value;
            }
            *out = byte;
        }
        Ok(())
    }
}

/// Writes payload bits into low-order channel bits.
///
/// Each write clears the target bit and ORs in the payload bit, leaving the
/// other bits of the channel untouched.
pub struct LsbWriter<'a> {
    image: &'a mut RgbaImage,
    depth: u8,
}

impl<'a> LsbWriter<'a> {
    pub fn new(image: &'a mut RgbaImage, depth: u8) -> Self {
        debug_assert!((1..=8).contains(&depth));
        Self { image, depth }
    }

    pub fn capacity(&self) -> u64 {
        capacity::lsb_capacity_bytes(self.image.width(), self.image.height(), self.depth)
    }

    /// Write `bytes` starting at byte `offset`, most-significant bit first.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        check_range(offset, bytes.len(), self.capacity())?;
        let width = self.image.width();

        for (i, &byte) in bytes.iter().enumerate() {
            for bit in 0..8u64 {
                let bit_index = (offset + i as u64) * 8 + bit;
                let value = (byte >> (7 - bit)) & 1;
                let (row, col, channel, bit_pos) = lsb_location(bit_index, width, self.depth);
                let target = &mut self.image.get_pixel_mut(col, row).0[channel];
                *target = (*target & !(1 << bit_pos)) | (value << bit_pos);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                ((x * 17 + y) % 256) as u8,
                ((y * 23 + x) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn test_direct_location_math() {
        // byte 7 of a 4-wide image: pixel 2, channel 1, row 0, col 2
        assert_eq!(direct_location(7, 4), (0, 2, 1));
        // byte 12: pixel 4 -> row 1, col 0, channel 0
        assert_eq!(direct_location(12, 4), (1, 0, 0));
    }

    #[test]
    fn test_direct_roundtrip() {
        let mut img = test_image(4, 4);
        let data = [1u8, 2, 3, 250, 0, 127];

        DirectWriter::new(&mut img).write_at(5, &data).unwrap();

        let mut back = [0u8; 6];
        DirectReader::new(&img).read_at(5, &mut back).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_direct_out_of_range() {
        let img = test_image(2, 2);
        // capacity is 12 bytes
        let mut buf = [0u8; 4];
        let result = DirectReader::new(&img).read_at(10, &mut buf);
        assert!(matches!(
            result,
            Err(Error::TruncatedContainer {
                needed: 14,
                available: 12
            })
        ));
    }

    #[test]
    fn test_lsb_roundtrip_all_depths() {
        for depth in 1..=8u8 {
            let mut img = test_image(16, 16);
            let data = [0xA5u8, 0x00, 0xFF, 0x3C];

            LsbWriter::new(&mut img, depth).write_at(2, &data).unwrap();

            let mut back = [0u8; 4];
            LsbReader::new(&img, depth).read_at(2, &mut back).unwrap();
            assert_eq!(back, data, "depth {depth}");
        }
    }

    #[test]
    fn test_lsb_depth_one_touches_only_low_bits() {
        let mut img = test_image(16, 16);
        let original = img.clone();

        LsbWriter::new(&mut img, 1).write_at(0, &[0xFF; 8]).unwrap();

        for (before, after) in original.pixels().zip(img.pixels()) {
            for ch in 0..3 {
                assert_eq!(before.0[ch] & 0xFE, after.0[ch] & 0xFE);
            }
            // alpha never changes
            assert_eq!(before.0[3], after.0[3]);
        }
    }

    #[test]
    fn test_lsb_out_of_range() {
        let img = test_image(1, 1);
        // 3 bits at depth 1: zero whole bytes
        let mut buf = [0u8; 1];
        assert!(LsbReader::new(&img, 1).read_at(0, &mut buf).is_err());
    }
}

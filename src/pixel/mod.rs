//! Pixel-grid addressing and capacity planning.
//!
//! Containers are flat byte sequences laid over a 2-D RGBA grid in one of
//! two addressing modes: direct (one byte per color channel) and LSB (one
//! payload bit per channel at a configurable bit depth). Only the three
//! color channels carry data; alpha is left untouched so containers survive
//! alpha premultiplication.

pub mod addressing;
pub mod capacity;

pub use addressing::{DirectReader, DirectWriter, LsbReader, LsbWriter};

use crate::error::Result;

/// Random-access byte view over an embedded container.
///
/// Implemented by both addressing modes so the header codec can parse
/// without knowing how the bytes are mapped to pixels.
pub trait ByteSource {
    /// Total container capacity in bytes.
    fn capacity(&self) -> u64;

    /// Read `buf.len()` bytes starting at `offset`.
    ///
    /// Fails with `TruncatedContainer` when the range does not fit.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

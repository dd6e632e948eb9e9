//! Reader for the legacy fixed-width container format.
//!
//! Layout, fixed widths only:
//!
//! ```text
//! signature "ST" (2) | payload size (8 LE) | filename (64, NUL-padded) | flag (1) | digest (16)
//! ```
//!
//! Legacy containers are read-only and plaintext-only. The stored 16-byte
//! digest comes from an older, weaker algorithm and is not re-verified;
//! callers receive a freshly computed SHA-256 over the extracted payload
//! instead, which is advisory rather than authoritative.

use crate::config::{LEGACY_DATA_OFFSET, LEGACY_NAME_FIELD, SIG_LEGACY};
use crate::error::{Error, Result};
use crate::pixel::ByteSource;

/// Parsed legacy header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyHeader {
    pub payload_len: u64,
    pub filename: String,
}

impl LegacyHeader {
    /// Offset of the payload; fixed for every legacy container.
    pub fn data_offset(&self) -> u64 {
        LEGACY_DATA_OFFSET as u64
    }

    /// Parse a legacy header from the start of a container.
    pub fn parse(source: &dyn ByteSource) -> Result<Self> {
        let mut sig = [0u8; 2];
        source.read_at(0, &mut sig)?;
        if sig != SIG_LEGACY {
            return Err(Error::UnsupportedFormat { signature: sig });
        }

        let mut size_bytes = [0u8; 8];
        source.read_at(2, &mut size_bytes)?;
        let payload_len = u64::from_le_bytes(size_bytes);

        let mut name_field = [0u8; LEGACY_NAME_FIELD];
        source.read_at(10, &mut name_field)?;
        let name_len = name_field
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        let filename = std::str::from_utf8(&name_field[..name_len])
            .map_err(|_| Error::MalformedHeader("legacy filename is not valid UTF-8".to_string()))?
            .to_string();

        let mut flag = [0u8; 1];
        source.read_at(74, &mut flag)?;
        if flag[0] != 0 {
            return Err(Error::UnsupportedEncryption);
        }

        Ok(Self {
            payload_len,
            filename,
        })
    }
}

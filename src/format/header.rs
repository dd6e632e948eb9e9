//! Header codec for the current container format.
//!
//! Direct subformat (signatures `SD`/`SE`, encryption implicit in the
//! signature):
//!
//! ```text
//! signature (2) | payload size (8 LE) | name length (4 LE) | name | padding | hash (32)
//! ```
//!
//! LSB subformat (signature `SL`, explicit encryption flag):
//!
//! ```text
//! signature (2) | payload size (8 LE) | name length (1) | name | flag (1) | padding | hash (32)
//! ```
//!
//! Padding brings the pre-hash length to a 4-byte boundary. The payload
//! follows the hash immediately.

use crate::config::{
    HASH_SIZE, MAX_FILENAME_BYTES, SIG_DIRECT_ENCRYPTED, SIG_DIRECT_PLAIN, SIG_LSB,
};
use crate::error::{Error, Result};
use crate::format::padding_len;
use crate::pixel::ByteSource;

/// Addressing mode declared by a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Whole bytes in channel values of a generated image.
    Direct,
    /// One payload bit per channel low-order bit of an existing carrier.
    Lsb,
}

/// Parsed or to-be-written container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub encoding: Encoding,
    /// Size of the (possibly encrypted) payload that follows the header.
    pub payload_len: u64,
    pub filename: String,
    pub encrypted: bool,
    /// SHA-256 of the plaintext payload, computed before encryption.
    pub content_hash: [u8; HASH_SIZE],
}

impl Header {
    /// Build a header, validating caller input.
    pub fn new(
        encoding: Encoding,
        payload_len: u64,
        filename: &str,
        encrypted: bool,
        content_hash: [u8; HASH_SIZE],
    ) -> Result<Self> {
        if filename.len() > MAX_FILENAME_BYTES {
            return Err(Error::InvalidArgument(format!(
                "filename is {} bytes, maximum is {}",
                filename.len(),
                MAX_FILENAME_BYTES
            )));
        }
        Ok(Self {
            encoding,
            payload_len,
            filename: filename.to_string(),
            encrypted,
            content_hash,
        })
    }

    /// Length of the fields before padding and hash.
    fn pre_hash_len(&self) -> usize {
        match self.encoding {
            // signature + size + u32 name length + name
            Encoding::Direct => 2 + 8 + 4 + self.filename.len(),
            // signature + size + u8 name length + name + flag
            Encoding::Lsb => 2 + 8 + 1 + self.filename.len() + 1,
        }
    }

    /// Total header size in bytes; the payload starts at this offset.
    pub fn len(&self) -> u64 {
        let pre = self.pre_hash_len();
        (pre + padding_len(pre) + HASH_SIZE) as u64
    }

    /// Serialize the header to its byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        match self.encoding {
            Encoding::Direct => {
                buf.extend_from_slice(if self.encrypted {
                    &SIG_DIRECT_ENCRYPTED
                } else {
                    &SIG_DIRECT_PLAIN
                });
                buf.extend_from_slice(&self.payload_len.to_le_bytes());
                buf.extend_from_slice(&(self.filename.len() as u32).to_le_bytes());
                buf.extend_from_slice(self.filename.as_bytes());
            }
            Encoding::Lsb => {
                buf.extend_from_slice(&SIG_LSB);
                buf.extend_from_slice(&self.payload_len.to_le_bytes());
                buf.push(self.filename.len() as u8);
                buf.extend_from_slice(self.filename.as_bytes());
                buf.push(self.encrypted as u8);
            }
        }
        buf.resize(buf.len() + padding_len(buf.len()), 0);
        buf.extend_from_slice(&self.content_hash);
        buf
    }

    /// Parse a current-format header from the start of a container.
    ///
    /// The source's own bound checks catch reads past the pixel capacity;
    /// declared lengths are checked here before they drive any read, so a
    /// corrupt length field surfaces as `MalformedHeader` rather than a
    /// huge allocation.
    pub fn parse(source: &dyn ByteSource) -> Result<Self> {
        let mut sig = [0u8; 2];
        read_header_bytes(source, 0, &mut sig)?;

        let (encoding, sig_encrypted) = match sig {
            SIG_DIRECT_PLAIN => (Encoding::Direct, false),
            SIG_DIRECT_ENCRYPTED => (Encoding::Direct, true),
            SIG_LSB => (Encoding::Lsb, false),
            _ => return Err(Error::UnsupportedFormat { signature: sig }),
        };

        let mut size_bytes = [0u8; 8];
        read_header_bytes(source, 2, &mut size_bytes)?;
        let payload_len = u64::from_le_bytes(size_bytes);

        let (name_len, name_offset) = match encoding {
            Encoding::Direct => {
                let mut len_bytes = [0u8; 4];
                read_header_bytes(source, 10, &mut len_bytes)?;
                (u32::from_le_bytes(len_bytes) as usize, 14u64)
            }
            Encoding::Lsb => {
                let mut len_byte = [0u8; 1];
                read_header_bytes(source, 10, &mut len_byte)?;
                (len_byte[0] as usize, 11u64)
            }
        };
        if name_len > MAX_FILENAME_BYTES {
            return Err(Error::MalformedHeader(format!(
                "declared filename length {name_len} exceeds the format maximum"
            )));
        }

        let mut name_bytes = vec![0u8; name_len];
        read_header_bytes(source, name_offset, &mut name_bytes)?;
        let filename = String::from_utf8(name_bytes)
            .map_err(|_| Error::MalformedHeader("filename is not valid UTF-8".to_string()))?;

        let mut cursor = name_offset + name_len as u64;
        let encrypted = match encoding {
            Encoding::Direct => sig_encrypted,
            Encoding::Lsb => {
                let mut flag = [0u8; 1];
                read_header_bytes(source, cursor, &mut flag)?;
                cursor += 1;
                match flag[0] {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(Error::MalformedHeader(format!(
                            "invalid encryption flag {other}"
                        )))
                    }
                }
            }
        };

        cursor += padding_len(cursor as usize) as u64;
        let mut content_hash = [0u8; HASH_SIZE];
        read_header_bytes(source, cursor, &mut content_hash)?;

        Ok(Self {
            encoding,
            payload_len,
            filename,
            encrypted,
            content_hash,
        })
    }
}

/// Header reads report capacity overruns as malformed headers: a header
/// that does not fit its carrier was never validly written.
fn read_header_bytes(source: &dyn ByteSource, offset: u64, buf: &mut [u8]) -> Result<()> {
    source.read_at(offset, buf).map_err(|e| match e {
        Error::TruncatedContainer { needed, available } => Error::MalformedHeader(format!(
            "header needs {needed} bytes but carrier holds {available}"
        )),
        other => other,
    })
}

//! Container formats and header codecs.
//!
//! The first two container bytes are an ASCII signature selecting one of a
//! closed set of formats: the current format in its direct (`SD` plaintext,
//! `SE` encrypted) and LSB (`SL`) subformats, and the read-only legacy
//! format (`ST`). Anything else is not a container this crate understands.

pub mod header;
pub mod legacy;

pub use header::{Encoding, Header};
pub use legacy::LegacyHeader;

use crate::config::{SIG_DIRECT_ENCRYPTED, SIG_DIRECT_PLAIN, SIG_LEGACY, SIG_LSB};

/// Known container signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Current format, direct addressing, plaintext payload.
    DirectPlain,
    /// Current format, direct addressing, encrypted payload.
    DirectEncrypted,
    /// Current format, LSB addressing (flag byte carries encryption).
    Lsb,
    /// Legacy fixed-width format.
    Legacy,
}

impl Signature {
    /// Classify two signature bytes, or `None` for unknown formats.
    pub fn classify(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            SIG_DIRECT_PLAIN => Some(Signature::DirectPlain),
            SIG_DIRECT_ENCRYPTED => Some(Signature::DirectEncrypted),
            SIG_LSB => Some(Signature::Lsb),
            SIG_LEGACY => Some(Signature::Legacy),
            _ => None,
        }
    }
}

/// Padding needed to align the pre-hash header length to a 4-byte boundary.
pub fn padding_len(pre_hash_len: usize) -> usize {
    (crate::config::HEADER_ALIGNMENT - pre_hash_len % crate::config::HEADER_ALIGNMENT)
        % crate::config::HEADER_ALIGNMENT
}

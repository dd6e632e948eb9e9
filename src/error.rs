//! Error types for the stegovault codec.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for stegovault operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, embedding or extracting containers.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a payload source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller input violates a stated precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Header bytes could not be parsed as the current format.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// The signature does not match any known container format.
    #[error("Unsupported format: signature {signature:02x?} is not a stegovault container")]
    UnsupportedFormat { signature: [u8; 2] },

    /// Declared lengths exceed the pixel capacity of the carrier.
    #[error("Truncated container: need {needed} bytes, carrier holds {available} bytes")]
    TruncatedContainer { needed: u64, available: u64 },

    /// The payload does not fit in the carrier at the requested bit depth.
    #[error("Insufficient capacity: need {required} bytes, carrier holds {available} bytes")]
    InsufficientCapacity { required: u64, available: u64 },

    /// Cipher-level failure (wrong password or corrupted ciphertext).
    #[error("Decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// Decoded payload does not match the stored content hash.
    #[error("Content hash mismatch: payload is corrupted or was tampered with")]
    HashMismatch,

    /// Legacy containers cannot carry encrypted payloads.
    #[error("Unsupported encryption: legacy containers are plaintext-only")]
    UnsupportedEncryption,

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Streaming operation exceeded its deadline.
    #[error("Operation timed out after {limit:?}")]
    TimedOut { limit: Duration },

    /// Operation was canceled by the caller.
    #[error("Operation canceled")]
    Canceled,

    /// Image decode/encode error from the carrier codec.
    #[error("Image error: {0}")]
    Image(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

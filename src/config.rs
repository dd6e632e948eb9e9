//! Configuration constants and types for stegovault.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signature of a generated-image container with a plaintext payload.
pub const SIG_DIRECT_PLAIN: [u8; 2] = *b"SD";

/// Signature of a generated-image container with an encrypted payload.
pub const SIG_DIRECT_ENCRYPTED: [u8; 2] = *b"SE";

/// Signature of an LSB container (encryption carried in a flag byte).
pub const SIG_LSB: [u8; 2] = *b"SL";

/// Signature of the legacy fixed-width format (read-only, plaintext-only).
pub const SIG_LEGACY: [u8; 2] = *b"ST";

/// SHA-256 content hash size in bytes.
pub const HASH_SIZE: usize = 32;

/// Legacy digest size in bytes (stored but not re-verified).
pub const LEGACY_HASH_SIZE: usize = 16;

/// Fixed width of the legacy filename field, NUL-padded.
pub const LEGACY_NAME_FIELD: usize = 64;

/// Offset of the payload in a legacy container, from fixed field widths only.
pub const LEGACY_DATA_OFFSET: usize = 2 + 8 + LEGACY_NAME_FIELD + 1 + LEGACY_HASH_SIZE;

/// Maximum UTF-8 filename length in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Maximum payload size accepted by the codec.
pub const MAX_PAYLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Header fields before the hash are padded to this boundary.
pub const HEADER_ALIGNMENT: usize = 4;

/// Color channels used for embedding (alpha is never touched).
pub const DATA_CHANNELS: usize = 3;

/// Background fill for freshly generated carrier images (opaque white).
pub const GENERATED_BACKGROUND: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// PBKDF2 parameters for password-based key derivation.
///
/// The salt is fixed at zero for wire compatibility with existing
/// containers: identical passwords always derive identical keys, which is a
/// known weakness of the format. See the `crypto::kdf` docs.
pub mod pbkdf2_params {
    /// Iteration count.
    pub const ITERATIONS: u32 = 10_000;

    /// Fixed all-zero salt.
    pub const SALT: [u8; 16] = [0u8; 16];

    /// Output key length in bytes (256 bits).
    pub const KEY_LENGTH: usize = 32;
}

/// AES-CBC initialization vector size in bytes.
pub const IV_SIZE: usize = 16;

/// Default streaming threshold (payloads at or above this stream).
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Default process-wide in-flight byte budget before streaming is forced.
pub const DEFAULT_MEMORY_BUDGET: u64 = 64 * 1024 * 1024;

/// Default bound on concurrent streaming operations.
pub const DEFAULT_MAX_CONCURRENT_STREAMS: usize = 4;

/// Default streaming deadline.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Default chunk size for streaming reads and pixel writes.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the adaptive resilience orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Whether the streaming path may be selected at all.
    pub streaming_enabled: bool,

    /// Known input sizes at or above this go to the streaming path.
    pub streaming_threshold: u64,

    /// In-flight byte budget; above it every request streams.
    pub memory_budget: u64,

    /// Bound on simultaneous streaming operations.
    pub max_concurrent_streams: usize,

    /// Deadline for one streaming operation.
    pub stream_timeout: Duration,

    /// Whether a failed streaming operation retries once in memory.
    pub fallback_enabled: bool,

    /// Chunk size for streaming reads.
    pub chunk_size: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            streaming_enabled: true,
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
            memory_budget: DEFAULT_MEMORY_BUDGET,
            max_concurrent_streams: DEFAULT_MAX_CONCURRENT_STREAMS,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            fallback_enabled: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ResilienceConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_streams == 0 {
            return Err("Concurrent stream limit must be at least 1".to_string());
        }
        if self.chunk_size == 0 {
            return Err("Chunk size must be greater than 0".to_string());
        }
        if self.stream_timeout.is_zero() {
            return Err("Stream timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ResilienceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_stream_limit_rejected() {
        let config = ResilienceConfig {
            max_concurrent_streams: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_legacy_data_offset() {
        assert_eq!(LEGACY_DATA_OFFSET, 91);
    }
}

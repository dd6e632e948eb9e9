//! Stegovault
//!
//! Embeds an arbitrary file inside a raster image and recovers it
//! losslessly, with optional password-based encryption and mandatory
//! content-hash verification.
//!
//! # Features
//!
//! - **Generated carriers**: pack whole container bytes into a fresh square
//!   image for maximum density
//! - **LSB embedding**: hide the container in the low-order channel bits of
//!   an existing image at a configurable bit depth
//! - **AES-256-CBC encryption**: password-protected payloads via PBKDF2 key
//!   derivation, verified by a SHA-256 content hash
//! - **Adaptive resilience**: per-request in-memory or streaming processing
//!   with bounded concurrency, deadlines and automatic fallback
//!
//! # Container layout
//!
//! ```text
//! header (signature, size, filename, flags, hash) || payload
//! ```
//!
//! # Example
//!
//! ```rust
//! use stegovault::codec;
//!
//! let image = codec::encode(b"hidden data", "note.txt", Some("password")).unwrap();
//!
//! let decoded = codec::decode(&image, Some("password")).unwrap();
//! assert_eq!(decoded.data, b"hidden data");
//! assert_eq!(decoded.filename, "note.txt");
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod format;
pub mod pixel;
pub mod resilience;
pub mod strategy;

pub use codec::{decode, encode, encode_into_carrier, peek_metadata, ContainerInfo, DecodedPayload};
pub use config::ResilienceConfig;
pub use error::{Error, Result};
pub use resilience::{CancelToken, Orchestrator};
pub use strategy::EmbedTarget;

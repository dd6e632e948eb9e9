//! Cryptographic operations for stegovault.
//!
//! This module provides:
//! - AES-256-CBC encryption with PKCS7 padding (the crypto envelope)
//! - PBKDF2-HMAC-SHA256 password-based key derivation

mod envelope;
mod kdf;

pub use envelope::{open, seal, Envelope};
pub use kdf::derive_key;

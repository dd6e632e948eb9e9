//! PBKDF2 key derivation for password-based encryption.
//!
//! The container format pins the salt to 16 zero bytes so that every
//! implementation derives the same key from the same password. Identical
//! passwords therefore always yield identical keys across containers, a
//! known weakness of the format; a per-container salt would break wire
//! compatibility with existing containers.

use crate::config::pbkdf2_params;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// Derive a 256-bit AES key from a password.
///
/// Uses PBKDF2-HMAC-SHA256 with a fixed iteration count and the format's
/// fixed zero salt.
pub fn derive_key(password: &str) -> [u8; pbkdf2_params::KEY_LENGTH] {
    let mut key = [0u8; pbkdf2_params::KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        &pbkdf2_params::SALT,
        pbkdf2_params::ITERATIONS,
        &mut key,
    );
    key
}

//! AES-256-CBC crypto envelope.
//!
//! The envelope is `IV (16 bytes) || ciphertext` with PKCS7 padding. It
//! carries no authentication tag: integrity comes solely from the content
//! hash of the plaintext stored in the container header. A wrong password
//! usually fails padding validation, but can also decrypt to garbage that
//! happens to unpad cleanly, which the hash check then catches.

use crate::config::{pbkdf2_params, IV_SIZE};
use crate::crypto::kdf::derive_key;
use crate::error::{Error, Result};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC envelope bound to one derived key.
pub struct Envelope {
    key: [u8; pbkdf2_params::KEY_LENGTH],
}

impl Envelope {
    /// Create an envelope from a password.
    pub fn from_password(password: &str) -> Self {
        Self {
            key: derive_key(password),
        }
    }

    /// Encrypt a payload with a fresh random IV.
    ///
    /// Returns: IV (16 bytes) || ciphertext.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut result = Vec::with_capacity(IV_SIZE + ciphertext.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&ciphertext);
        result
    }

    /// Decrypt a payload produced by `encrypt`.
    ///
    /// Fails with [`Error::DecryptionFailed`] when the input is shorter
    /// than one IV plus one block, or when PKCS7 unpadding rejects the
    /// final block. Callers should surface this as "wrong password".
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() < IV_SIZE + 16 {
            return Err(Error::DecryptionFailed);
        }

        let (iv, ciphertext) = envelope.split_at(IV_SIZE);
        let iv: [u8; IV_SIZE] = iv.try_into().map_err(|_| Error::DecryptionFailed)?;

        Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Error::DecryptionFailed)
    }

    /// Ciphertext length for a plaintext of `len` bytes, IV included.
    ///
    /// PKCS7 always pads, so the ciphertext is the next block boundary
    /// strictly above `len`.
    pub fn sealed_len(len: u64) -> u64 {
        IV_SIZE as u64 + (len / 16 + 1) * 16
    }
}

/// Encrypt a payload with a password.
pub fn seal(plaintext: &[u8], password: &str) -> Vec<u8> {
    Envelope::from_password(password).encrypt(plaintext)
}

/// Decrypt a payload with a password.
pub fn open(envelope: &[u8], password: &str) -> Result<Vec<u8>> {
    Envelope::from_password(password).decrypt(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"Hello, World! This is a secret message.";
        let password = "secure_password_123";

        let sealed = seal(plaintext, password);
        let opened = open(&sealed, password).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_envelope_layout() {
        let sealed = seal(b"data", "pw");

        assert_eq!(sealed.len() as u64, Envelope::sealed_len(4));
        // 16-byte IV plus one padded block
        assert_eq!(sealed.len(), 32);
    }

    #[test]
    fn test_wrong_password_fails_or_differs() {
        let plaintext = b"Secret data";
        let sealed = seal(plaintext, "correct_password");

        match open(&sealed, "wrong_password") {
            Err(Error::DecryptionFailed) => {}
            Ok(garbage) => assert_ne!(garbage, plaintext),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let sealed = seal(b"", "password");
        let opened = open(&sealed, "password").unwrap();

        assert!(opened.is_empty());
        assert_eq!(sealed.len() as u64, Envelope::sealed_len(0));
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let sealed1 = seal(b"Same message", "password");
        let sealed2 = seal(b"Same message", "password");

        assert_ne!(sealed1, sealed2);
    }

    #[test]
    fn test_truncated_envelope_rejected() {
        let result = open(&[0u8; 20], "password");
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn test_large_plaintext() {
        let plaintext: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();
        let sealed = seal(&plaintext, "password");
        let opened = open(&sealed, "password").unwrap();

        assert_eq!(opened, plaintext);
    }
}

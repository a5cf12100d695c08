//! AES-256-GCM envelope encryption for stored secrets.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext; the combined blob is base64-encoded
//! into the single string that gets persisted.  `decrypt` splits the
//! nonce back out before decrypting.
//!
//! Layout of the base64-decoded blob:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! Failure policy: every fault (malformed base64, truncated blob, auth
//! tag mismatch, wrong key, invalid UTF-8) surfaces as the same
//! `CryptoOperationFailed` error so callers can't be used as a padding
//! or tamper oracle.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the derived key in bytes (256 bits).
const KEY_LEN: usize = 32;

/// Symmetric encryption engine holding the passphrase-derived key.
///
/// The key is computed once with a single SHA-256 digest of the operator
/// passphrase (collapsing arbitrary-length secret material into a fixed
/// 256-bit key) and zeroized when the engine is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionEngine {
    key: [u8; KEY_LEN],
}

impl EncryptionEngine {
    /// Build an engine from the operator-supplied passphrase.
    pub fn new(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Encrypt `plaintext`, returning base64(nonce || ciphertext).
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        // Generate a random 12-byte nonce.  It is not secret, but it must
        // be unique per encryption.
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        // Prepend the nonce so only one blob needs to be stored.
        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by `encrypt`.
    ///
    /// Expects the first 12 decoded bytes to be the nonce, followed by the
    /// ciphertext and auth tag.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let blob = BASE64
            .decode(encoded)
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        // Make sure there is at least a nonce worth of bytes.
        if blob.len() < NONCE_LEN {
            return Err(CredVaultError::CryptoOperationFailed);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        // Decrypt and verify the auth tag.
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        String::from_utf8(plaintext).map_err(|_| CredVaultError::CryptoOperationFailed)
    }
}

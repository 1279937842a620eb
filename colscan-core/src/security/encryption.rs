//! AES-GCM sealing of stored connection passwords.
//!
//! A sealed password is `base64(nonce || ciphertext || tag)` with a fresh
//! random 96-bit nonce per seal, keyed by a 32-byte service key.

use crate::error::{ColscanError, Result};
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

/// AES-GCM nonce size: 96 bits
const AES_GCM_NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size: 128 bits
const AES_GCM_TAG_SIZE: usize = 16;

/// AES-256 key size
pub const AES_KEY_SIZE: usize = 32;

/// Seals and opens connection passwords with AES-256-GCM.
///
/// # Example
///
/// ```rust
/// use colscan_core::security::PasswordCipher;
///
/// let cipher = PasswordCipher::from_key_str("0123456789abcdef0123456789abcdef")?;
/// let sealed = cipher.seal("db-password")?;
/// assert_ne!(sealed, "db-password");
/// assert_eq!(cipher.open(&sealed)?.as_str(), "db-password");
/// # Ok::<(), colscan_core::ColscanError>(())
/// ```
#[derive(Clone)]
pub struct PasswordCipher {
    cipher: Aes256Gcm,
}

impl PasswordCipher {
    /// Creates a cipher from a raw 32-byte key.
    ///
    /// # Errors
    /// Returns an encryption error if the key is not exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != AES_KEY_SIZE {
            return Err(ColscanError::encryption(format!(
                "Encryption key must be exactly {} bytes, got {}",
                AES_KEY_SIZE,
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| ColscanError::encryption("Invalid encryption key"))?;
        Ok(Self { cipher })
    }

    /// Creates a cipher from a 32-character key string.
    ///
    /// # Errors
    /// See [`Self::new`].
    pub fn from_key_str(key: &str) -> Result<Self> {
        Self::new(key.as_bytes())
    }

    /// Encrypts a password with a fresh random nonce.
    ///
    /// # Errors
    /// Returns an encryption error if AES-GCM fails.
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| ColscanError::encryption("Failed to seal password"))?;

        let mut sealed = Vec::with_capacity(AES_GCM_NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypts a sealed password.
    ///
    /// # Errors
    /// Returns an encryption error for malformed input, a wrong key, or
    /// tampered ciphertext. The error never includes the input.
    pub fn open(&self, sealed: &str) -> Result<Zeroizing<String>> {
        let bytes = STANDARD
            .decode(sealed.trim())
            .map_err(|_| ColscanError::encryption("Sealed password is not valid base64"))?;

        if bytes.len() < AES_GCM_NONCE_SIZE + AES_GCM_TAG_SIZE {
            return Err(ColscanError::encryption("Sealed password is too short"));
        }

        let (nonce, ciphertext) = bytes.split_at(AES_GCM_NONCE_SIZE);
        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(nonce), ciphertext)
                .map_err(|_| {
                    ColscanError::encryption("Failed to open sealed password (wrong key or tampered)")
                })?,
        );

        let password = std::str::from_utf8(&plaintext)
            .map_err(|_| ColscanError::encryption("Sealed password is not valid UTF-8"))?;
        Ok(Zeroizing::new(password.to_string()))
    }
}

impl std::fmt::Debug for PasswordCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCipher").finish_non_exhaustive()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # File Encryption at Rest
//!
//! AES-256-GCM with a single process-wide key handed in at construction.
//! Every call to [`CryptoEngine::encrypt`] draws a fresh 96-bit nonce from
//! the OS CSPRNG.
//!
//! ## Payload Layout
//!
//! ```text
//! +-----------+-----------+----------------------+
//! | nonce(12) |  tag(16)  | ciphertext(len(pt))  |
//! +-----------+-----------+----------------------+
//! ```
//!
//! GCM is a counter-mode construction, so the ciphertext is exactly as long
//! as the plaintext and the total overhead is 28 bytes. The tag is verified
//! before any plaintext is released.

use std::fmt;
use std::sync::Arc;

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce, Tag,
};
use base64::{engine::general_purpose, Engine};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key size for AES-256 (32 bytes).
pub const KEY_SIZE: usize = 32;

/// Nonce size for AES-GCM (12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Bytes added to every plaintext.
pub const PAYLOAD_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Error type for encryption operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("encryption failed")]
    EncryptionFailed,

    /// Tag mismatch, wrong key or truncated payload. Deliberately carries
    /// no detail about which check failed.
    #[error("decryption failed")]
    DecryptionFailure,
}

/// 256-bit symmetric key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 64 hex characters (optionally `0x`-prefixed) or
    /// from standard / URL-safe base64 of exactly 32 bytes.
    pub fn parse(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CryptoError::InvalidKey("key is empty".to_string()));
        }

        let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = if hex_str.len() == KEY_SIZE * 2
            && hex_str.chars().all(|c| c.is_ascii_hexdigit())
        {
            hex::decode(hex_str).map_err(|e| CryptoError::InvalidKey(format!("bad hex: {e}")))?
        } else {
            general_purpose::STANDARD
                .decode(trimmed)
                .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(trimmed))
                .map_err(|e| CryptoError::InvalidKey(format!("bad base64: {e}")))?
        };

        let result = <[u8; KEY_SIZE]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| {
                CryptoError::InvalidKey(format!("expected {KEY_SIZE} bytes, got {}", bytes.len()))
            });
        bytes.zeroize();
        result
    }

    fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Source of per-message nonces.
///
/// Production uses [`OsNonceSource`]; tests may inject a fixed sequence.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> [u8; NONCE_SIZE];
}

/// Nonces drawn from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}

/// Self-describing encrypted blob: `nonce ‖ tag ‖ ciphertext`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedPayload(Vec<u8>);

impl EncryptedPayload {
    /// Wrap bytes read from storage. Structure is checked on decrypt.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nonce field, if the payload is long enough to have one.
    pub fn nonce(&self) -> Option<&[u8]> {
        self.0.get(..NONCE_SIZE)
    }

    /// Split into `(nonce, tag, ciphertext)`.
    fn split(&self) -> Result<(&[u8], &[u8], &[u8]), CryptoError> {
        if self.0.len() < PAYLOAD_OVERHEAD {
            return Err(CryptoError::DecryptionFailure);
        }
        let (nonce, rest) = self.0.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);
        Ok((nonce, tag, ciphertext))
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedPayload({} bytes)", self.0.len())
    }
}

/// AEAD engine holding the process-wide key.
///
/// Cheap to clone and safe to share between tasks; there is no mutable state.
#[derive(Clone)]
pub struct CryptoEngine {
    cipher: Aes256Gcm,
    nonces: Arc<dyn NonceSource>,
}

impl CryptoEngine {
    pub fn new(key: &EncryptionKey) -> Self {
        Self::with_nonce_source(key, Arc::new(OsNonceSource))
    }

    pub fn with_nonce_source(key: &EncryptionKey, nonces: Arc<dyn NonceSource>) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher, nonces }
    }

    /// Encrypt `plaintext` under a fresh nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
        let nonce = self.nonces.next_nonce();

        let mut buffer = plaintext.to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(PAYLOAD_OVERHEAD + buffer.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(tag.as_slice());
        out.extend_from_slice(&buffer);
        Ok(EncryptedPayload(out))
    }

    /// Verify and decrypt. Fails closed: nothing is returned unless the tag
    /// checks out.
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
        let (nonce, tag, ciphertext) = payload.split()?;

        let mut buffer = ciphertext.to_vec();
        match self.cipher.decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        ) {
            Ok(()) => Ok(buffer),
            Err(_) => {
                buffer.zeroize();
                Err(CryptoError::DecryptionFailure)
            }
        }
    }

    /// Encrypt and decrypt a probe value. Used by the readiness check.
    pub fn self_test(&self) -> Result<(), CryptoError> {
        let probe = b"safezone-vault self test";
        let payload = self.encrypt(probe)?;
        if self.decrypt(&payload)? == probe {
            Ok(())
        } else {
            Err(CryptoError::DecryptionFailure)
        }
    }
}

impl fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoEngine").finish_non_exhaustive()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric sealing of ticket bytes.
//!
//! ## Wire Layout
//!
//! ```text
//! nonce (12 bytes) || ciphertext || GCM tag (16 bytes)
//! ```
//!
//! Every call to [`Cipher::encrypt`] draws a fresh nonce from the system
//! CSPRNG, so sealing the same plaintext twice yields different output.
//! The nonce travels in front of the ciphertext; nothing else is needed to
//! open a sealed ticket besides the key.
//!
//! The associated data is a fixed context label. Bytes sealed by this
//! module for another purpose under the same key will not open as tickets.

use std::fmt;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Associated data bound into every sealed ticket.
const CONTEXT: &[u8] = b"cookie-ticket:v1";

/// Error building a [`TicketKey`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("ticket key must be exactly 16 bytes, got {0}")]
    InvalidLength(usize),
}

/// Error from the cipher engine.
///
/// Decryption failures carry no detail. A wrong key looks the same as a
/// truncated or tampered input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("unable to seal ticket")]
    Encryption,
    #[error("unable to open ticket")]
    Decryption,
}

/// A 128-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct TicketKey([u8; KEY_LEN]);

impl TicketKey {
    /// Build a key from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self(key))
    }

    /// Build a key from its configured text form (the UTF-8 bytes of a
    /// 16-byte string).
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TicketKey(<redacted>)")
    }
}

/// AES-128-GCM engine bound to a single key for its whole lifetime.
pub struct Cipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl Cipher {
    pub fn new(key: &TicketKey) -> Self {
        // A 16-byte key is always accepted by AES-128-GCM.
        let unbound = match UnboundKey::new(&AES_128_GCM, key.as_bytes()) {
            Ok(unbound) => unbound,
            Err(_) => unreachable!("AES-128-GCM rejected a {KEY_LEN}-byte key"),
        };
        Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        }
    }

    /// Seal `plaintext`, returning `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CipherError::Encryption)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::from(CONTEXT), &mut in_out)
            .map_err(|_| CipherError::Encryption)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    /// Open bytes produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Decryption);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CipherError::Decryption)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::from(CONTEXT), &mut in_out)
            .map_err(|_| CipherError::Decryption)?
            .len();
        in_out.truncate(plaintext_len);
        Ok(in_out)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("algorithm", &"AES-128-GCM")
            .finish_non_exhaustive()
    }
}

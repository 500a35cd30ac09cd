// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sealbox

//! Passphrase-keyed sealing of feedback text.
//!
//! ## Envelope Format
//!
//! ```text
//! sealed:v1:<base64(nonce)>:<base64(ciphertext)>
//! ```
//!
//! The cipher key is SHA-256 of the operator passphrase and the AEAD is
//! ChaCha20-Poly1305 with a fresh random 96-bit nonce per seal, so equal
//! plaintexts never produce equal envelopes.
//!
//! Opening with the wrong passphrase fails authentication rather than
//! yielding garbage. Callers on the read path treat that failure as a soft
//! outcome: the stored envelope is passed through untouched instead of being
//! reported as an error (see [`RecoveredText`]).

use base64ct::{Base64, Encoding};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Envelope prefix identifying the sealing scheme and version.
const ENVELOPE_PREFIX: &str = "sealed:v1";

/// ChaCha20-Poly1305 nonce length in bytes.
const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("malformed envelope")]
    MalformedEnvelope,

    #[error("envelope encoding error")]
    Encoding,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,

    #[error("sealed text is not valid UTF-8")]
    Utf8,
}

/// Derive the 256-bit cipher key from the operator passphrase.
fn derive_key(secret: &str) -> [u8; 32] {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

/// Seal plaintext under the given passphrase.
///
/// Every call draws a fresh nonce from the OS RNG, so sealing the same text
/// twice yields two different envelopes.
pub fn seal(plaintext: &str, secret: &str) -> Result<String, CipherError> {
    let key = derive_key(secret);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|_| CipherError::Encrypt)?;

    Ok(format!(
        "{ENVELOPE_PREFIX}:{}:{}",
        Base64::encode_string(&nonce_bytes),
        Base64::encode_string(&ciphertext)
    ))
}

/// Open a sealed envelope with the given passphrase.
///
/// Fails on a malformed envelope, a wrong passphrase, or tampered
/// ciphertext. Never panics.
pub fn open(envelope: &str, secret: &str) -> Result<String, CipherError> {
    let rest = envelope
        .strip_prefix(ENVELOPE_PREFIX)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or(CipherError::MalformedEnvelope)?;

    let (nonce_b64, ct_b64) = rest.split_once(':').ok_or(CipherError::MalformedEnvelope)?;
    if ct_b64.contains(':') {
        return Err(CipherError::MalformedEnvelope);
    }

    let nonce_bytes = Base64::decode_vec(nonce_b64).map_err(|_| CipherError::Encoding)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(CipherError::MalformedEnvelope);
    }
    let ciphertext = Base64::decode_vec(ct_b64).map_err(|_| CipherError::Encoding)?;

    let key = derive_key(secret);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| CipherError::Decrypt)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::Utf8)
}

/// Outcome of recovering feedback text with a candidate passphrase.
///
/// The read path never rejects a wrong passphrase; it degrades to the stored
/// envelope instead. Keeping the two arms distinct lets callers decide where
/// to collapse them into a single wire string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveredText {
    /// Decryption succeeded; carries the original plaintext.
    Clear(String),
    /// Decryption failed; carries the stored envelope verbatim.
    Opaque(String),
}

impl RecoveredText {
    /// Try to open the envelope, degrading to the envelope itself on any
    /// failure or on an empty result.
    pub fn recover(envelope: &str, secret: &str) -> Self {
        match open(envelope, secret) {
            Ok(text) if !text.is_empty() => Self::Clear(text),
            _ => Self::Opaque(envelope.to_string()),
        }
    }

    /// Collapse to the single text carried on the wire.
    pub fn into_text(self) -> String {
        match self {
            Self::Clear(text) | Self::Opaque(text) => text,
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear(_))
    }
}

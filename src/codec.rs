//! Text-safe payload encoding.
//!
//! The carrier channel only moves printable text. `PayloadCodec` wraps a
//! `CipherBox` blob in standard base64 (with `=` padding) on the way in and
//! reverses it on the way out.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::crypto::CipherBox;
use crate::error::SteglockError;
use crate::keys::SymmetricKey;

/// Bridge between binary cipher output and the text-only carrier channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCodec;

impl PayloadCodec {
    /// Encrypt `message` under `key` and base64-encode the blob.
    ///
    /// Two calls with the same inputs give different text because each
    /// encryption draws a fresh IV.
    pub fn pack(message: &[u8], key: &SymmetricKey) -> Result<String, SteglockError> {
        let cipher = CipherBox::from_slice(key.expose_bytes())?;
        Self::pack_with(&cipher, message)
    }

    /// Decode payload text and decrypt it under `key`.
    pub fn unpack(payload: &str, key: &SymmetricKey) -> Result<Vec<u8>, SteglockError> {
        let cipher = CipherBox::from_slice(key.expose_bytes())?;
        Self::unpack_with(&cipher, payload)
    }

    /// `pack` with an already constructed cipher.
    pub fn pack_with(cipher: &CipherBox, message: &[u8]) -> Result<String, SteglockError> {
        let blob = cipher.encrypt(message)?;
        Ok(STANDARD.encode(blob))
    }

    /// `unpack` with an already constructed cipher.
    ///
    /// Fails with `EncodingCorrupt` on characters outside the alphabet or a
    /// length that is not a whole number of 4-character groups. Cipher
    /// errors are propagated unchanged.
    pub fn unpack_with(cipher: &CipherBox, payload: &str) -> Result<Vec<u8>, SteglockError> {
        let blob = STANDARD.decode(payload.trim()).map_err(|err| {
            tracing::debug!(%err, payload_len = payload.len(), "payload is not valid base64");
            SteglockError::EncodingCorrupt
        })?;
        cipher.decrypt(&blob)
    }
}

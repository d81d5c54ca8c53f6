//! Symmetric key ownership.
//!
//! `SymmetricKey` is the only way key material enters the crate. Its single
//! constructor accepts raw bytes of an AES key length and rejects everything
//! else: a caller-supplied key is never padded or truncated.
//!
//! - Not `Clone`. Duplicating a key requires going back through the bytes.
//! - Zeroised on drop.
//! - `Debug` prints only the length.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SteglockError;

/// Key lengths accepted by AES-128, AES-192 and AES-256.
pub const KEY_LENS: [usize; 3] = [16, 24, 32];

/// Length of a freshly generated secret (AES-256).
pub const GENERATED_KEY_LEN: usize = 32;

/// A validated AES key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Construct a key from raw bytes.
    ///
    /// Fails with `InvalidKeyLength` unless `bytes` is 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SteglockError> {
        if !KEY_LENS.contains(&bytes.len()) {
            return Err(SteglockError::InvalidKeyLength(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Length of the key in bytes: 16, 24 or 32.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a `SymmetricKey` cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw key bytes.
    ///
    /// Exposed so callers can persist a generated secret through `KeyVault`.
    pub fn expose_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

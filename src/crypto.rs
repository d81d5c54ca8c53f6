//! Low-level cryptographic operations.
//!
//! `CipherBox` is the only place in the crate that touches the block cipher.
//! Every other module encrypts and decrypts exclusively through it.
//!
//! Primitive choices:
//! - **Cipher**: AES-128/192/256, selected by key length
//! - **Mode**: CBC, each ciphertext block chained to the previous one
//! - **Padding**: PKCS#7, validated on decrypt
//! - **IV**: 128 bits, generated fresh per operation via `SystemRandom`
//!
//! There is no authentication tag. The padding check is the only corruption
//! detector: a random wrong key or a flipped bit yields valid padding with
//! probability of roughly 1/256 (a final plaintext byte of `0x01`), in which
//! case `decrypt` returns garbage instead of an error. That residual
//! false-accept rate is accepted for this format.

use std::fs;
use std::path::{Path, PathBuf};

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::SteglockError;
use crate::keys::{SymmetricKey, GENERATED_KEY_LEN};
use crate::store;

/// Size of the initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Suffix appended by `CipherBox::encrypt_file`.
pub const ENCRYPTED_FILE_SUFFIX: &str = ".enc";

/// Fill a fixed-size buffer from the system RNG.
fn random_bytes<const N: usize>() -> Result<[u8; N], SteglockError> {
    let rng = SystemRandom::new();
    let mut buf = [0u8; N];
    rng.fill(&mut buf).map_err(|_| SteglockError::RandomnessFailure)?;
    Ok(buf)
}

/// Generate a cryptographically secure random AES-256 key.
pub fn generate_random_key() -> Result<SymmetricKey, SteglockError> {
    let mut bytes = random_bytes::<GENERATED_KEY_LEN>()?;
    let key = SymmetricKey::from_bytes(&bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    key
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, SteglockError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let encryptor = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SteglockError::InvalidKeyLength(key.len()))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>, SteglockError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SteglockError::InvalidKeyLength(key.len()))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| SteglockError::PaddingValidationFailure)
}

/// Symmetric encrypt/decrypt primitive bound to one key.
///
/// Stateless apart from the key: every `encrypt` draws a new IV and nothing
/// is cached between calls.
///
/// # Blob layout
/// ```text
/// [ IV (16 bytes) ][ AES-CBC(PKCS#7(plaintext)) ]
/// ```
#[derive(Debug)]
pub struct CipherBox {
    key: SymmetricKey,
}

impl CipherBox {
    /// Bind a cipher to a validated key.
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Build a cipher straight from raw key bytes.
    ///
    /// Fails with `InvalidKeyLength` unless the slice is 16, 24 or 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, SteglockError> {
        SymmetricKey::from_bytes(key).map(Self::new)
    }

    /// Length in bytes of the key this cipher was built with.
    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// Encrypt `plaintext`, returning IV || ciphertext.
    ///
    /// The output is always `IV_LEN` plus a whole, non-zero number of blocks;
    /// an empty plaintext still produces one block of padding.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, SteglockError> {
        let iv = random_bytes::<IV_LEN>()?;
        let key = self.key.expose_bytes();

        let body = match key.len() {
            16 => cbc_encrypt::<Aes128>(key, &iv, plaintext)?,
            24 => cbc_encrypt::<Aes192>(key, &iv, plaintext)?,
            32 => cbc_encrypt::<Aes256>(key, &iv, plaintext)?,
            other => return Err(SteglockError::InvalidKeyLength(other)),
        };

        let mut output = Vec::with_capacity(IV_LEN + body.len());
        output.extend_from_slice(&iv);
        output.extend_from_slice(&body);

        tracing::debug!(
            plaintext_len = plaintext.len(),
            blob_len = output.len(),
            "payload encrypted"
        );
        Ok(output)
    }

    /// Decrypt a blob produced by `encrypt`.
    ///
    /// Returns the full plaintext or an error, never a partial result. A
    /// wrong key and a corrupted blob both fail with
    /// `PaddingValidationFailure`.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, SteglockError> {
        if blob.len() < IV_LEN {
            return Err(SteglockError::MalformedCiphertext);
        }
        let (iv, body) = blob.split_at(IV_LEN);
        if body.is_empty() || body.len() % BLOCK_LEN != 0 {
            return Err(SteglockError::MalformedCiphertext);
        }

        let key = self.key.expose_bytes();
        let result = match key.len() {
            16 => cbc_decrypt::<Aes128>(key, iv, body),
            24 => cbc_decrypt::<Aes192>(key, iv, body),
            32 => cbc_decrypt::<Aes256>(key, iv, body),
            other => Err(SteglockError::InvalidKeyLength(other)),
        };

        match &result {
            Ok(plaintext) => tracing::debug!(
                blob_len = blob.len(),
                plaintext_len = plaintext.len(),
                "payload decrypted"
            ),
            Err(err) => tracing::debug!(blob_len = blob.len(), %err, "payload rejected"),
        }
        result
    }

    /// Encrypt a file on disk into `<path>.enc` and remove the original.
    ///
    /// The encrypted file is written atomically before the source is
    /// removed, so a failure part-way leaves the plaintext in place. If the
    /// removal itself fails, the error is returned and both the plaintext
    /// and the `.enc` file remain on disk; the caller must clean up.
    pub fn encrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, SteglockError> {
        let path = path.as_ref();
        let plaintext = fs::read(path)?;
        let blob = self.encrypt(&plaintext)?;

        let mut target = path.as_os_str().to_owned();
        target.push(ENCRYPTED_FILE_SUFFIX);
        let target = PathBuf::from(target);

        store::write_atomic(&target, &blob)?;
        fs::remove_file(path)?;

        tracing::info!(source = %path.display(), target = %target.display(), "file encrypted");
        Ok(target)
    }

    /// Read an encrypted file and return its plaintext. Nothing is written.
    pub fn decrypt_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, SteglockError> {
        let blob = fs::read(path.as_ref())?;
        self.decrypt(&blob)
    }
}

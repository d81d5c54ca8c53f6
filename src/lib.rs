//! # steglock
//!
//! Symmetric confidentiality layer and key-file custody for messages that
//! travel through an image steganography channel.
//!
//! A message is encrypted with AES-CBC under a [`SymmetricKey`], wrapped in
//! base64 by [`PayloadCodec`], and handed to a [`CarrierChannel`] that hides
//! it in an image. Keys are kept at rest as encrypted key files managed by
//! [`KeyVault`], each protected by a wrapping key the caller holds.
//!
//! ## Public API
//!
//! The surface is deliberately small: keys, the cipher, the payload codec,
//! the vault with its stores, and the carrier contract. Everything operates
//! synchronously and returns `Result<_, SteglockError>`.

pub mod audit;
pub mod channel;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod store;
pub mod vault;

pub use channel::{conceal, reveal, CarrierChannel};
pub use codec::PayloadCodec;
pub use config::VaultConfig;
pub use crypto::CipherBox;
pub use error::SteglockError;
pub use keys::SymmetricKey;
pub use store::{FsKeyStore, KeyStore, MemoryKeyStore};
pub use vault::KeyVault;

/// Generate a cryptographically secure 32-byte secret.
///
/// This is the only entry point for producing key material. The caller
/// decides whether to persist it, typically via
/// [`KeyVault::create_key_file`].
pub fn generate_secret() -> Result<SymmetricKey, SteglockError> {
    crypto::generate_random_key()
}

//! Error types for steglock.
//!
//! Every variant is a distinct failure mode of the confidentiality layer or
//! the key store. Cryptographic failures are deliberately coarse: a wrong key
//! and a tampered ciphertext produce the same `PaddingValidationFailure`, so
//! the error never tells an observer which of the two happened.

use std::fmt;
use std::io;

/// The single error type for all steglock operations.
#[derive(Debug)]
pub enum SteglockError {
    /// A key was not 16, 24 or 32 bytes long. Carries the rejected length.
    InvalidKeyLength(usize),

    /// The blob is shorter than one IV, or its body is empty or not a whole
    /// number of cipher blocks.
    MalformedCiphertext,

    /// The padding recovered after decryption was invalid. Wrong key and
    /// corrupted data are reported identically.
    PaddingValidationFailure,

    /// A payload text was not valid base64.
    EncodingCorrupt,

    /// The system random number generator failed.
    RandomnessFailure,

    /// No key file exists for the given name.
    KeyFileNotFound(String),

    /// A key file already exists and the request was not a regeneration.
    KeyFileExists(String),

    /// The key file name is empty or would escape the key store.
    InvalidKeyFileName(String),

    /// A recovered secret was requested as text but is not UTF-8.
    SecretNotText,

    /// The configuration file could not be parsed.
    InvalidConfig(serde_json::Error),

    /// The carrier channel failed to embed or extract a payload.
    Carrier(String),

    /// A filesystem error, passed through unmodified.
    Io(io::Error),
}

impl fmt::Display for SteglockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength(len) => {
                write!(f, "invalid key length: {} bytes (expected 16, 24 or 32)", len)
            }
            Self::MalformedCiphertext => write!(f, "malformed ciphertext"),
            Self::PaddingValidationFailure => write!(f, "decryption failed"),
            Self::EncodingCorrupt => write!(f, "payload encoding is corrupt"),
            Self::RandomnessFailure => write!(f, "randomness source failed"),
            Self::KeyFileNotFound(name) => write!(f, "key file not found: {}", name),
            Self::KeyFileExists(name) => write!(f, "key file already exists: {}", name),
            Self::InvalidKeyFileName(name) => write!(f, "invalid key file name: {:?}", name),
            Self::SecretNotText => write!(f, "secret is not valid UTF-8 text"),
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {}", err),
            Self::Carrier(reason) => write!(f, "carrier channel failed: {}", reason),
            Self::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for SteglockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SteglockError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

//! Key file custody.
//!
//! `KeyVault` generates secrets, persists them encrypted under a caller-held
//! wrapping key, and recovers them later. The wrapping key is always a
//! parameter: the vault never invents one, never stores one, and never keeps
//! a decrypted secret beyond the call that produced it.

use crate::audit::{AuditLog, AuditRecord, AuditSink, KeyEvent};
use crate::crypto::{self, CipherBox};
use crate::error::SteglockError;
use crate::keys::SymmetricKey;
use crate::store::{self, KeyStore};

/// Lifecycle manager for named, encrypted key files.
pub struct KeyVault<S: KeyStore> {
    store: S,
    audit: AuditLog,
}

impl<S: KeyStore> KeyVault<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            audit: AuditLog::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Forward every audit record to an additional sink.
    pub fn add_audit_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.audit.add_forward_sink(sink);
    }

    /// Whether the in-memory audit log keeps records. On by default; turn it
    /// off for long-lived vaults that forward records to a sink.
    pub fn set_audit_retention(&mut self, retain: bool) {
        self.audit.set_retain(retain);
    }

    /// Produce a fresh 32-byte secret. Nothing is persisted.
    pub fn generate_secret() -> Result<SymmetricKey, SteglockError> {
        crypto::generate_random_key()
    }

    /// Whether a key file exists for `name`. No decryption is attempted.
    pub fn key_file_exists(&self, name: &str) -> Result<bool, SteglockError> {
        self.store.exists(name)
    }

    /// Encrypt `secret` under `wrapping` and store it as a new key file.
    ///
    /// Fails with `KeyFileExists` if `name` is taken; use
    /// `regenerate_key_file` to replace it.
    pub fn create_key_file(
        &mut self,
        name: &str,
        secret: &[u8],
        wrapping: &SymmetricKey,
    ) -> Result<(), SteglockError> {
        store::validate_name(name)?;
        if self.store.exists(name)? {
            return Err(SteglockError::KeyFileExists(name.to_string()));
        }
        self.seal_into_store(name, secret, wrapping)?;
        self.audit.append(AuditRecord::now(name, KeyEvent::Created));
        tracing::info!(key_name = name, "key file created");
        Ok(())
    }

    /// Encrypt `secret` under `wrapping`, replacing any existing key file.
    pub fn regenerate_key_file(
        &mut self,
        name: &str,
        secret: &[u8],
        wrapping: &SymmetricKey,
    ) -> Result<(), SteglockError> {
        store::validate_name(name)?;
        let existed = self.store.exists(name)?;
        self.seal_into_store(name, secret, wrapping)?;
        let event = if existed {
            KeyEvent::Regenerated
        } else {
            KeyEvent::Created
        };
        self.audit.append(AuditRecord::now(name, event));
        tracing::info!(key_name = name, replaced = existed, "key file regenerated");
        Ok(())
    }

    /// Store a user-chosen text secret. The text is kept as its UTF-8 bytes.
    pub fn create_text_key_file(
        &mut self,
        name: &str,
        secret: &str,
        wrapping: &SymmetricKey,
    ) -> Result<(), SteglockError> {
        self.create_key_file(name, secret.as_bytes(), wrapping)
    }

    /// Decrypt the key file `name` with `wrapping` and return the secret.
    ///
    /// A wrong wrapping key surfaces as `PaddingValidationFailure` and is
    /// audited as `OpenRejected`. Store errors (missing file, I/O) are
    /// returned before any decryption and are not audited.
    pub fn open_key_file(
        &mut self,
        name: &str,
        wrapping: &SymmetricKey,
    ) -> Result<Vec<u8>, SteglockError> {
        let blob = self.store.read(name)?;
        let cipher = CipherBox::from_slice(wrapping.expose_bytes())?;
        match cipher.decrypt(&blob) {
            Ok(secret) => {
                self.audit.append(AuditRecord::now(name, KeyEvent::Opened));
                tracing::debug!(key_name = name, "key file opened");
                Ok(secret)
            }
            Err(err) => {
                self.audit.append(AuditRecord::now(name, KeyEvent::OpenRejected));
                tracing::warn!(key_name = name, %err, "key file could not be opened");
                Err(err)
            }
        }
    }

    /// Open a text key file. Fails with `SecretNotText` if the stored bytes
    /// are not UTF-8.
    pub fn open_text_key_file(
        &mut self,
        name: &str,
        wrapping: &SymmetricKey,
    ) -> Result<String, SteglockError> {
        let secret = self.open_key_file(name, wrapping)?;
        String::from_utf8(secret).map_err(|err| {
            let mut bytes = err.into_bytes();
            zeroize::Zeroize::zeroize(&mut bytes);
            SteglockError::SecretNotText
        })
    }

    /// Open a key file holding a raw AES key and build a cipher from it.
    ///
    /// A stored value that is not 16, 24 or 32 bytes fails with
    /// `InvalidKeyLength`; it is never padded or truncated.
    pub fn open_key_as_cipher(
        &mut self,
        name: &str,
        wrapping: &SymmetricKey,
    ) -> Result<CipherBox, SteglockError> {
        let mut secret = self.open_key_file(name, wrapping)?;
        let cipher = CipherBox::from_slice(&secret);
        zeroize::Zeroize::zeroize(&mut secret);
        cipher
    }

    /// Remove the key file `name`.
    pub fn delete_key_file(&mut self, name: &str) -> Result<(), SteglockError> {
        self.store.delete(name)?;
        self.audit.append(AuditRecord::now(name, KeyEvent::Deleted));
        tracing::info!(key_name = name, "key file deleted");
        Ok(())
    }

    fn seal_into_store(
        &self,
        name: &str,
        secret: &[u8],
        wrapping: &SymmetricKey,
    ) -> Result<(), SteglockError> {
        let cipher = CipherBox::from_slice(wrapping.expose_bytes())?;
        let blob = cipher.encrypt(secret)?;
        self.store.write(name, &blob)
    }
}

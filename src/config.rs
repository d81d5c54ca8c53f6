//! Key store configuration.
//!
//! Configuration is an explicit value handed to whoever builds a store; there
//! is no process-wide settings object. `VaultConfig::load` overlays a JSON
//! file on the defaults, so a file only needs the fields it changes:
//!
//! ```json
//! { "key_file_directory": "/srv/stego/Key_file" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SteglockError;
use crate::store::{FsKeyStore, DEFAULT_KEY_FILE_SUFFIX};

/// Where and how key files are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Directory holding the encrypted key files.
    pub key_file_directory: PathBuf,
    /// Suffix appended to each key file name.
    pub key_file_suffix: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_file_directory: PathBuf::from("Key_file"),
            key_file_suffix: DEFAULT_KEY_FILE_SUFFIX.to_string(),
        }
    }
}

impl VaultConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// parsed is an error rather than a silent fallback.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SteglockError> {
        let path = path.as_ref();
        if !path.try_exists()? {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(SteglockError::InvalidConfig)?;
        tracing::info!(
            path = %path.display(),
            key_file_directory = %config.key_file_directory.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Build the filesystem key store this configuration describes.
    pub fn open_store(&self) -> FsKeyStore {
        FsKeyStore::with_suffix(&self.key_file_directory, &self.key_file_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VaultConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(config, VaultConfig::default());
        assert_eq!(config.key_file_suffix, ".txt.enc");
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "key_file_directory": "/tmp/keys" }"#).unwrap();

        let config = VaultConfig::load(&path).unwrap();
        assert_eq!(config.key_file_directory, PathBuf::from("/tmp/keys"));
        assert_eq!(config.key_file_suffix, DEFAULT_KEY_FILE_SUFFIX);
    }

    #[test]
    fn test_unparseable_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            VaultConfig::load(&path),
            Err(SteglockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_open_store_uses_configured_suffix() {
        let config = VaultConfig {
            key_file_directory: PathBuf::from("/keys"),
            key_file_suffix: ".key".into(),
        };
        let store = config.open_store();
        assert_eq!(store.path_for("alice").unwrap(), PathBuf::from("/keys/alice.key"));
    }
}

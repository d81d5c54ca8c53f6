//! Name-addressed storage for encrypted key files.
//!
//! A store holds opaque bytes (in practice one encrypted blob per name) and
//! knows nothing about keys or ciphers. Writes must be atomic with respect to
//! readers: nobody may ever observe a half-written key file.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;

use crate::error::SteglockError;

/// Suffix appended to every key file name on disk.
pub const DEFAULT_KEY_FILE_SUFFIX: &str = ".txt.enc";

/// A byte-blob store addressed by key file name.
pub trait KeyStore: Send + Sync {
    /// Atomically create or replace the blob stored under `name`.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SteglockError>;

    /// Read the blob stored under `name`.
    fn read(&self, name: &str) -> Result<Vec<u8>, SteglockError>;

    /// Whether a blob exists under `name`. Never reads its contents.
    fn exists(&self, name: &str) -> Result<bool, SteglockError>;

    /// Remove the blob stored under `name`.
    fn delete(&self, name: &str) -> Result<(), SteglockError>;
}

/// Reject names that are empty or could resolve outside the store. `:` is
/// refused because a drive prefix such as `C:x` escapes `Path::join` on
/// Windows.
pub fn validate_name(name: &str) -> Result<(), SteglockError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':', '\0'])
        || name.contains("..");
    if bad {
        return Err(SteglockError::InvalidKeyFileName(name.to_string()));
    }
    Ok(())
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_atomic_with(path, |file| file.write_all(bytes))
}

/// Create a uniquely named temp file next to `path`, fill it with `fill`,
/// then rename it over `path`. If `fill` fails the temp file is removed and
/// `path` is left untouched.
pub(crate) fn write_atomic_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// Key files kept as `<directory>/<name><suffix>`.
#[derive(Debug, Clone)]
pub struct FsKeyStore {
    directory: PathBuf,
    suffix: String,
}

impl FsKeyStore {
    /// A store rooted at `directory` using the default `.txt.enc` suffix.
    /// The directory is created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_suffix(directory, DEFAULT_KEY_FILE_SUFFIX)
    }

    pub fn with_suffix(directory: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            suffix: suffix.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The on-disk path for a key file name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, SteglockError> {
        validate_name(name)?;
        Ok(self.directory.join(format!("{}{}", name, self.suffix)))
    }
}

fn not_found(name: &str, err: io::Error) -> SteglockError {
    if err.kind() == io::ErrorKind::NotFound {
        SteglockError::KeyFileNotFound(name.to_string())
    } else {
        SteglockError::Io(err)
    }
}

impl KeyStore for FsKeyStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SteglockError> {
        let path = self.path_for(name)?;
        write_atomic(&path, bytes)?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "key file written");
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, SteglockError> {
        let path = self.path_for(name)?;
        fs::read(&path).map_err(|err| not_found(name, err))
    }

    fn exists(&self, name: &str) -> Result<bool, SteglockError> {
        let path = self.path_for(name)?;
        Ok(path.try_exists()?)
    }

    fn delete(&self, name: &str) -> Result<(), SteglockError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|err| not_found(name, err))?;
        tracing::debug!(path = %path.display(), "key file removed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A store that lives in memory only. Replacing an entry is atomic because
/// the whole map sits behind one lock.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SteglockError {
    SteglockError::Io(io::Error::new(io::ErrorKind::Other, "key store lock poisoned"))
}

impl KeyStore for MemoryKeyStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SteglockError> {
        validate_name(name)?;
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, SteglockError> {
        validate_name(name)?;
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| SteglockError::KeyFileNotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> Result<bool, SteglockError> {
        validate_name(name)?;
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.contains_key(name))
    }

    fn delete(&self, name: &str) -> Result<(), SteglockError> {
        validate_name(name)?;
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SteglockError::KeyFileNotFound(name.to_string()))
    }
}

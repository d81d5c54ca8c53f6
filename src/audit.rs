//! Key custody audit logging.
//!
//! Records every key file lifecycle event. The log is append-only and never
//! contains key material, only names, event kinds and timestamps.
//! Supports pluggable sinks for forwarding records to files or elsewhere.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sink that receives audit records. Implement this to forward records
/// to a file, database or other persistent store.
pub trait AuditSink: Send {
    /// Append a record. Called for every key file event.
    fn append(&mut self, record: AuditRecord);
}

/// What happened to a key file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEvent {
    /// A key file was written for a name that had none.
    Created,
    /// An existing key file was overwritten on request.
    Regenerated,
    /// A key file was decrypted successfully.
    Opened,
    /// Decryption of a key file failed (wrong wrapping key or corruption).
    OpenRejected,
    /// A key file was removed.
    Deleted,
}

/// A permanent record of a key file event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The key file name the event concerns.
    pub key_name: String,
    pub event: KeyEvent,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn now(key_name: &str, event: KeyEvent) -> Self {
        Self {
            key_name: key_name.to_string(),
            event,
            timestamp: Utc::now(),
        }
    }
}

/// An append-only log of key file events.
/// Can forward records to additional sinks via `add_forward_sink`.
///
/// By default every record is also kept in memory for the lifetime of the
/// log, one per key file event. Long-running owners that forward records
/// elsewhere can stop that with `set_retain(false)`.
#[derive(Serialize, Deserialize)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    #[serde(skip)]
    forward_sinks: Vec<Box<dyn AuditSink>>,
    #[serde(skip, default = "retain_by_default")]
    retain: bool,
}

fn retain_by_default() -> bool {
    true
}

impl Default for AuditLog {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            forward_sinks: Vec::new(),
            retain: true,
        }
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("records", &self.records)
            .field("forward_sinks", &self.forward_sinks.len())
            .field("retain", &self.retain)
            .finish()
    }
}

impl Clone for AuditLog {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            forward_sinks: Vec::new(), // Forward sinks are not cloned
            retain: self.retain,
        }
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to receive a copy of every record, without replacing the
    /// in-memory log.
    pub fn add_forward_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.forward_sinks.push(sink);
    }

    /// Keep (`true`, the default) or stop keeping records in memory.
    /// Turning retention off also drops the records held so far; sinks keep
    /// receiving every record either way.
    pub fn set_retain(&mut self, retain: bool) {
        self.retain = retain;
        if !retain {
            self.records = Vec::new();
        }
    }

    /// Append a new record to the log and forward to any attached sinks.
    pub fn append(&mut self, record: AuditRecord) {
        for sink in self.forward_sinks.iter_mut() {
            sink.append(record.clone());
        }
        if self.retain {
            self.records.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditRecord> {
        self.records.iter()
    }

    /// Records for a single key file name, oldest first.
    pub fn for_key<'a>(&'a self, key_name: &'a str) -> impl Iterator<Item = &'a AuditRecord> + 'a {
        self.records.iter().filter(move |r| r.key_name == key_name)
    }
}

// ---------------------------------------------------------------------------
// Built-in sink: file
// ---------------------------------------------------------------------------

/// Writes audit records as JSON lines (one per record) to a file.
/// Creates the file if it doesn't exist; appends if it does.
pub struct FileAuditSink {
    file: std::fs::File,
}

impl FileAuditSink {
    /// Open or create a file for append-only audit logging.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, record: AuditRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(err) = writeln!(self.file, "{line}").and_then(|_| self.file.flush()) {
                    tracing::warn!(%err, "failed to write audit record");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize audit record"),
        }
    }
}

//! Minimal example: protect a message for an image carrier.
//!
//! Generates a message key, parks it in a key file under a wrapping key,
//! recovers it as a receiver would, and round-trips a payload.
//! Run with: `cargo run --example stego_roundtrip`
//!
//! The carrier here just writes the payload text next to the image; a real
//! deployment plugs its pixel-level embedder into `CarrierChannel`.

use std::fs;
use std::path::Path;

use steglock::audit::FileAuditSink;
use steglock::{conceal, reveal, CarrierChannel, KeyVault, SteglockError, SymmetricKey, VaultConfig};
use tracing_subscriber::EnvFilter;

struct SidecarChannel;

impl CarrierChannel for SidecarChannel {
    fn embed(&self, source: &Path, payload: &str, dest: &Path) -> Result<(), SteglockError> {
        fs::copy(source, dest)?;
        fs::write(dest.with_extension("payload"), payload)?;
        Ok(())
    }

    fn extract(&self, stego: &Path) -> Result<String, SteglockError> {
        Ok(fs::read_to_string(stego.with_extension("payload"))?)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let workdir = std::env::temp_dir().join("steglock_demo");
    fs::create_dir_all(&workdir)?;

    // 1. Configuration: defaults overlaid by an optional JSON file.
    let mut config = VaultConfig::load(workdir.join("config.json"))?;
    config.key_file_directory = workdir.join("Key_file");

    let mut vault = KeyVault::new(config.open_store());
    vault.add_audit_sink(Box::new(FileAuditSink::new(workdir.join("audit.jsonl"))?));

    // 2. The wrapping key is agreed out of band. Never generate and discard it.
    let wrapping = SymmetricKey::from_bytes(b"shared-out-of-band-wrapping-key!")?;

    // 3. Sender creates the message key once.
    let message_key = steglock::generate_secret()?;
    vault.regenerate_key_file("demo", message_key.expose_bytes(), &wrapping)?;

    let cover = workdir.join("cover.png");
    fs::write(&cover, b"\x89PNG placeholder")?;
    let stego = workdir.join("stego.png");

    let cipher = vault.open_key_as_cipher("demo", &wrapping)?;
    conceal(&SidecarChannel, &cipher, b"Meet at the old mill.", &cover, &stego)?;
    println!("Concealed message in {}", stego.display());

    // 4. Receiver recovers the key and the message.
    let cipher = vault.open_key_as_cipher("demo", &wrapping)?;
    let message = reveal(&SidecarChannel, &cipher, &stego)?;
    println!("Revealed: {}", String::from_utf8_lossy(&message));

    println!("Audit log: {} record(s)", vault.audit_log().len());
    for record in vault.audit_log().iter() {
        println!("  {} {:?} @ {}", record.key_name, record.event, record.timestamp);
    }

    Ok(())
}

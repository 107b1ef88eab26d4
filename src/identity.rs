//! Identity storage module
//!
//! Durable local storage for exactly one value: the encrypted user
//! identifier issued by the dialogue service at registration. The value is
//! stored as ciphertext only; the plaintext identifier never touches disk.
//!
//! The record lives in a small JSON file. Writes go through a temp file and
//! an atomic rename, so callers never observe a partial write; an internal
//! mutex serializes concurrent writers (last-writer-wins).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk record holding the single stored slot
#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityRecord {
    /// Encrypted user identifier, absent before first registration
    user_id: Option<String>,
}

/// File-backed store for the (encrypted) user identifier
#[derive(Debug)]
pub struct IdentityStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl IdentityStore {
    /// Create a store persisting to the given file path
    ///
    /// The file is created on first [`IdentityStore::set`]; a missing file
    /// reads as absent.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Get the stored encrypted identifier, or `None` if never set
    pub fn get(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.read_record()?.user_id)
    }

    /// Overwrite the stored encrypted identifier
    pub fn set(&self, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        self.write_record(&IdentityRecord {
            user_id: Some(value.to_string()),
        })
    }

    /// Remove the stored identifier; Ok if nothing was stored
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        if !self.path.exists() {
            return Ok(());
        }

        std::fs::remove_file(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to clear identity file: {}", e)))
    }

    fn read_record(&self) -> Result<IdentityRecord> {
        if !self.path.exists() {
            return Ok(IdentityRecord::default());
        }

        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to read identity file: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(IdentityRecord::default());
        }

        serde_json::from_str(&data)
            .map_err(|e| Error::Storage(format!("Failed to parse identity file: {}", e)))
    }

    fn write_record(&self, record: &IdentityRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create identity dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(record)?;

        // Temp file + rename keeps a crashed write from leaving a torn record
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::Storage(format!("Failed to write identity file: {}", e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("Failed to commit identity file: {}", e)))?;

        Ok(())
    }
}

fn poisoned() -> Error {
    Error::Storage("Identity store lock poisoned".to_string())
}

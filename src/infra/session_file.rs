//! Usage: Durable storage for the session record (atomic JSON file).
//!
//! One record at a fixed storage key. Writes go through a temp file plus a
//! backup rename so a crash mid-write never leaves a corrupt record behind.

use std::path::{Path, PathBuf};

use crate::domain::session::Session;
use crate::shared::error::StorageError;

/// Fixed storage key for the session record; the on-disk file is
/// `<storage key>.json` inside the data directory.
pub const STORAGE_KEY: &str = "senvanda_auth";

/// Location of the durable session record.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record. `Ok(None)` when no record exists.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    /// Replace the stored record atomically.
    pub fn store(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let backup_path = self.path.with_extension("json.bak");

        let content = serde_json::to_vec_pretty(session)?;
        std::fs::write(&tmp_path, content)?;

        if backup_path.exists() {
            let _ = std::fs::remove_file(&backup_path);
        }

        if self.path.exists() {
            std::fs::rename(&self.path, &backup_path)?;
        }

        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::rename(&backup_path, &self.path);
            return Err(err.into());
        }

        if backup_path.exists() {
            let _ = std::fs::remove_file(&backup_path);
        }

        Ok(())
    }

    /// Remove the stored record. Missing files are not an error.
    pub fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

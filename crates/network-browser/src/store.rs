// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot persistence.
//!
//! Snapshots are written to `<path>.tmp`, synced, then renamed over `<path>`.
//! Readers see either the previous document or the new one, never a partial
//! write.

use crate::types::NetworkSnapshot;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Snapshot file with atomic replacement.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temporary file: `<path>.tmp`.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Replace the stored snapshot with `snapshot`.
    pub fn save(&self, snapshot: &NetworkSnapshot) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(snapshot).map_err(PersistenceError::Serialize)?;
        let tmp = self.temp_path();

        if let Err(source) = write_synced(&tmp, content.as_bytes()) {
            discard(&tmp);
            return Err(PersistenceError::Write { path: tmp, source });
        }
        if let Err(source) = fs::rename(&tmp, &self.path) {
            discard(&tmp);
            return Err(PersistenceError::Rename {
                from: tmp,
                to: self.path.clone(),
                source,
            });
        }

        info!(
            path = %self.path.display(),
            schains = snapshot.schains.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<NetworkSnapshot, PersistenceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard(tmp: &Path) {
    match fs::remove_file(tmp) {
        Ok(()) => debug!(path = %tmp.display(), "Removed temporary snapshot"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), error = %e, "Failed to remove temporary snapshot"),
    }
}

//! File-backed score storage
//!
//! Features:
//! - Versioned JSON envelope
//! - File and parent directories created on first use
//! - Append-only inserts
//! - Atomic replace (tmp -> store) so a crash never truncates the table

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScoreStoreError;
use crate::highscores::{ScoreRecord, ScoreStore, rank};

/// Current envelope version
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    records: Vec<ScoreRecord>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            records: Vec::new(),
        }
    }
}

/// Score table kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    /// Open the store, creating an empty table if the file is absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ScoreStoreError> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| store.io(source))?;
            }
            store.write(&Envelope::default())?;
            log::info!("Created score table at {}", store.path.display());
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> ScoreStoreError {
        ScoreStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Envelope, ScoreStoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Envelope::default()),
            Err(e) => return Err(self.io(e)),
        };
        serde_json::from_str(&json).map_err(|source| ScoreStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, envelope: &Envelope) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string_pretty(envelope).map_err(|source| {
            ScoreStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| self.io(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io(source))
    }
}

impl ScoreStore for JsonScoreStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<(), ScoreStoreError> {
        let mut envelope = self.read()?;
        envelope.records.push(record.clone());
        self.write(&envelope)
    }

    fn ranked(&self) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        let mut records = self.read()?.records;
        rank(&mut records);
        Ok(records)
    }
}

//! The flat JSON collection written at the end of a run.

use super::VectorRecord;
use crate::error::{Result, VidsearchError};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// All records of one run, in video processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    records: Vec<VectorRecord>,
}

/// What happened when the database was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The file at `path` was replaced with `records` records.
    Saved { path: PathBuf, records: usize },
    /// No records; nothing was written.
    Empty,
}

impl Database {
    pub fn new(records: Vec<VectorRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct video ids in first-seen order.
    pub fn video_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for record in &self.records {
            if !ids.contains(&record.video_id.as_str()) {
                ids.push(&record.video_id);
            }
        }
        ids
    }

    /// Write every record to `path` as one JSON array, replacing any existing file.
    ///
    /// The document is written to a temporary file next to `path` and renamed
    /// into place, so readers never see a partial database. An empty database
    /// is not written.
    #[instrument(skip(self), fields(records = self.records.len()))]
    pub fn persist(&self, path: &Path) -> Result<PersistOutcome> {
        if self.records.is_empty() {
            return Ok(PersistOutcome::Empty);
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &self.records)?;
            writer.flush()?;
        }

        tmp.persist(path)
            .map_err(|e| VidsearchError::Persistence(format!("{}: {}", path.display(), e)))?;

        info!("Saved {} records to {}", self.records.len(), path.display());

        Ok(PersistOutcome::Saved {
            path: path.to_path_buf(),
            records: self.records.len(),
        })
    }

    /// Read a database previously written by [`Database::persist`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let records: Vec<VectorRecord> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { records })
    }
}

impl From<Vec<VectorRecord>> for Database {
    fn from(records: Vec<VectorRecord>) -> Self {
        Self::new(records)
    }
}

//! Session journal: one trainee's session history as JSON Lines.
//!
//! Appends and clears take an exclusive lock, reads a shared one, so a CLI
//! logging a workout cannot interleave with an evaluation clearing history.

use crate::{RawSessionRow, Result, SessionRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only session log for a single trainee
pub struct SessionJournal {
    path: PathBuf,
}

impl SessionJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one record as a JSON line
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&RawSessionRow::from(record))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;
        tracing::debug!("Appended session {} to {:?}", record.id, self.path);
        Ok(())
    }

    /// Read every row. Lines that are not valid JSON are logged and skipped;
    /// field validation is left to ingestion.
    pub fn read_rows(&self) -> Result<Vec<RawSessionRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut rows = Vec::new();

        for (line_num, bytes) in reader.split(b'\n').enumerate() {
            let line = match String::from_utf8(bytes?) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(
                        "Skipping undecodable session at {:?} line {}: {}",
                        self.path,
                        line_num + 1,
                        e
                    );
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<RawSessionRow>(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse session at {:?} line {}: {}",
                        self.path,
                        line_num + 1,
                        e
                    );
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} session rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }

    /// Remove all history. A missing journal is already clear.
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.lock_exclusive()?;
        file.set_len(0)?;
        file.sync_all()?;
        file.unlock()?;

        tracing::info!("Cleared session history at {:?}", self.path);
        Ok(())
    }
}

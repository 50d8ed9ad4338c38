//! CSV session import.
//!
//! Expected columns: `id,exercise,correct_reps,wrong_reps,duration_seconds,performed_at`
//! (the export format). `id` may be empty. Rows that cannot be read are
//! logged and skipped; field validation happens at ingestion.

use crate::{RawSessionRow, Result};
use csv::ReaderBuilder;
use std::path::Path;

/// Read raw session rows from a CSV file
pub fn read_sessions_csv(path: &Path) -> Result<Vec<RawSessionRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<RawSessionRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!("Failed to read CSV row {} of {:?}: {}", index + 1, path, e);
            }
        }
    }

    tracing::info!("Read {} session rows from {:?}", rows.len(), path);
    Ok(rows)
}

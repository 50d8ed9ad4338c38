//! Analytics tables and CSV export.
//!
//! The summary mirrors the workout-completion screen: a rep table, a time
//! table and the session count. Export writes the raw history so it can be
//! archived or re-imported.

use crate::types::*;
use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// One line of the rep-based table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepRow {
    pub exercise: Exercise,
    pub total: u64,
    pub correct: u64,
    pub wrong: u64,
}

/// One line of the time-based table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeRow {
    pub exercise: Exercise,
    pub total_seconds: u64,
}

/// Workout completion summary
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_sessions: usize,
    pub rep_rows: Vec<RepRow>,
    pub time_rows: Vec<TimeRow>,
}

impl AnalyticsSummary {
    pub fn from_totals(totals: &AggregateTotals) -> Self {
        Self {
            total_sessions: totals.total_sessions,
            rep_rows: totals
                .reps
                .iter()
                .map(|(exercise, r)| RepRow {
                    exercise: *exercise,
                    total: r.total,
                    correct: r.correct,
                    wrong: r.wrong,
                })
                .collect(),
            time_rows: totals
                .time
                .iter()
                .map(|(exercise, t)| TimeRow {
                    exercise: *exercise,
                    total_seconds: t.total_seconds,
                })
                .collect(),
        }
    }
}

/// Write session history as CSV (with header), synced to disk.
/// Returns the number of rows written.
pub fn export_sessions_csv(records: &[SessionRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(File::create(path)?);

    for record in records {
        writer.serialize(RawSessionRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use chrono::Utc;

    fn records() -> Vec<SessionRecord> {
        let now = Utc::now();
        vec![
            SessionRecord::reps(Exercise::Squat, 10, 2, now).unwrap(),
            SessionRecord::reps(Exercise::PushUp, 7, 3, now).unwrap(),
            SessionRecord::timed(Exercise::Plank, 35, now).unwrap(),
        ]
    }

    #[test]
    fn test_summary_tables() {
        let summary = AnalyticsSummary::from_totals(&aggregate(&records()));
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(
            summary.rep_rows,
            vec![
                RepRow {
                    exercise: Exercise::PushUp,
                    total: 10,
                    correct: 7,
                    wrong: 3
                },
                RepRow {
                    exercise: Exercise::Squat,
                    total: 12,
                    correct: 10,
                    wrong: 2
                },
            ]
        );
        assert_eq!(
            summary.time_rows,
            vec![TimeRow {
                exercise: Exercise::Plank,
                total_seconds: 35
            }]
        );
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/sessions.csv");

        let count = export_sessions_csv(&records(), &path).unwrap();
        assert_eq!(count, 3);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("id,exercise,correct_reps,wrong_reps,duration_seconds,performed_at"));
        assert!(contents.contains("Plank,0,0,35"));
    }

    #[test]
    fn test_export_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.csv");

        assert_eq!(export_sessions_csv(&[], &path).unwrap(), 0);
        assert!(path.exists());
    }
}

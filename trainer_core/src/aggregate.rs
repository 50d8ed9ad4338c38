//! Session aggregation.
//!
//! Raw rows are validated once at ingestion, then folded into per-exercise
//! totals. Nothing here is cached: every evaluation recomputes from the full
//! history, so running it twice over the same rows gives the same totals.

use crate::types::*;
use std::collections::HashSet;

/// Validated records plus the number of rows that were dropped
#[derive(Clone, Debug, Default)]
pub struct Ingested {
    pub records: Vec<SessionRecord>,
    pub rejected: usize,
}

/// Validate raw rows, skipping (and logging) anything malformed.
///
/// A bad row never aborts the pass: partial data still produces analytics.
/// Rows whose id was already seen are dropped so a re-imported file does not
/// count twice.
pub fn ingest<I>(rows: I) -> Ingested
where
    I: IntoIterator<Item = RawSessionRow>,
{
    let mut ingested = Ingested::default();
    let mut seen_ids = HashSet::new();

    for (index, row) in rows.into_iter().enumerate() {
        match SessionRecord::try_from(row) {
            Ok(record) => {
                if seen_ids.insert(record.id) {
                    ingested.records.push(record);
                } else {
                    tracing::warn!("Skipping duplicate session {} (row {})", record.id, index + 1);
                    ingested.rejected += 1;
                }
            }
            Err(e) => {
                tracing::warn!("Skipping session row {}: {}", index + 1, e);
                ingested.rejected += 1;
            }
        }
    }

    tracing::debug!(
        "Ingested {} session records ({} rejected)",
        ingested.records.len(),
        ingested.rejected
    );
    ingested
}

/// Fold session records into per-exercise totals
pub fn aggregate(records: &[SessionRecord]) -> AggregateTotals {
    let mut totals = AggregateTotals {
        total_sessions: records.len(),
        ..AggregateTotals::default()
    };

    for record in records {
        match record.measurement() {
            Measurement::Reps { correct, wrong } => {
                let bucket = totals.reps.entry(record.exercise).or_default();
                bucket.correct += u64::from(correct);
                bucket.wrong += u64::from(wrong);
                bucket.total += u64::from(correct) + u64::from(wrong);
            }
            Measurement::Seconds(seconds) => {
                let bucket = totals.time.entry(record.exercise).or_default();
                bucket.total_seconds += u64::from(seconds);
                bucket.session_count += 1;
            }
            Measurement::Empty => {}
        }
    }

    totals
}

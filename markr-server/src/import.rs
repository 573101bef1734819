//! Reconciliation importer
//!
//! Merges validated records into the store under a "best score wins" policy:
//! a stored result's available and obtained marks only ever increase.
//!
//! Records are applied one at a time in submission order, each in its own
//! transaction. The student upsert is the first statement of every
//! transaction, so the transaction already holds SQLite's write lock when it
//! reads an existing result; concurrent imports of the same key therefore
//! cannot interleave between the read and the update.

use chrono::{DateTime, NaiveDateTime, Utc};
use markr_common::db::{MarksUpdate, ResultStore, Student, TestResult};
use tracing::{debug, info};

use crate::error::ImportError;
use crate::validate::ValidatedRecord;

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No result existed for the key
    Inserted,
    /// The stored result was raised
    Updated,
    /// The stored result already had equal or better marks
    Unchanged,
}

/// Counts of merge outcomes for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ImportSummary {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// Applies validated records to a [`ResultStore`]
#[derive(Debug, Clone)]
pub struct Importer {
    store: ResultStore,
}

impl Importer {
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }

    /// Import a batch
    ///
    /// Every timestamp is parsed before the first write, so a bad timestamp
    /// rejects the batch without touching the store. A persistence failure
    /// aborts the failing record; records before it stay committed.
    pub async fn import(&self, records: &[ValidatedRecord]) -> Result<ImportSummary, ImportError> {
        let prepared = records
            .iter()
            .map(|record| -> Result<_, ImportError> {
                Ok((student_of(record), result_of(record)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = ImportSummary::default();
        for (student, result) in &prepared {
            let outcome = self.merge(student, result).await?;
            debug!(key = %result.id, ?outcome, "Merged result");
            summary.record(outcome);
        }

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Imported {} result(s)",
            summary.total()
        );
        Ok(summary)
    }

    /// Merge one record inside its own transaction
    async fn merge(&self, student: &Student, incoming: &TestResult) -> Result<MergeOutcome, ImportError> {
        let mut tx = self.store.begin().await?;

        tx.upsert_student(student).await?;

        if tx.insert_result_if_absent(incoming).await? {
            tx.commit().await?;
            return Ok(MergeOutcome::Inserted);
        }

        let outcome = match tx
            .get_result_by_key(incoming.test_id, incoming.student_id)
            .await?
        {
            Some(existing) => {
                let update = best_marks(&existing, incoming);
                if tx
                    .update_result(incoming.test_id, incoming.student_id, update)
                    .await?
                {
                    MergeOutcome::Updated
                } else {
                    MergeOutcome::Unchanged
                }
            }
            // Conflicting row vanished between insert and read; cannot happen while
            // the write lock is held, treat as nothing to merge
            None => MergeOutcome::Unchanged,
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

/// Columns of `existing` that `incoming` improves on
///
/// Available and obtained marks are compared independently.
pub fn best_marks(existing: &TestResult, incoming: &TestResult) -> MarksUpdate {
    MarksUpdate {
        marks_available: (incoming.marks_available > existing.marks_available)
            .then_some(incoming.marks_available),
        marks_obtained: (incoming.marks_obtained > existing.marks_obtained)
            .then_some(incoming.marks_obtained),
    }
}

fn student_of(record: &ValidatedRecord) -> Student {
    Student {
        id: record.student_number,
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
    }
}

fn result_of(record: &ValidatedRecord) -> Result<TestResult, ImportError> {
    Ok(TestResult::new(
        record.test_id,
        record.student_number,
        record.summary_marks.available,
        record.summary_marks.obtained,
        parse_scanned_on(&record.scanned_on)?,
    ))
}

/// Parse a scan timestamp into UTC
///
/// Accepts RFC 3339 (`2017-12-04T12:12:10+11:00`). A timestamp without an
/// offset is taken as UTC.
pub fn parse_scanned_on(text: &str) -> Result<DateTime<Utc>, ImportError> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ImportError::InvalidTimestamp(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(available: i64, obtained: i64) -> TestResult {
        TestResult::new(1234, 5678, available, obtained, Utc::now())
    }

    #[test]
    fn test_best_marks_independent_columns() {
        assert_eq!(best_marks(&stored(20, 13), &stored(19, 12)), MarksUpdate::default());
        assert_eq!(
            best_marks(&stored(20, 13), &stored(21, 14)),
            MarksUpdate {
                marks_available: Some(21),
                marks_obtained: Some(14)
            }
        );
        assert_eq!(
            best_marks(&stored(20, 13), &stored(19, 15)),
            MarksUpdate {
                marks_available: None,
                marks_obtained: Some(15)
            }
        );
        assert_eq!(
            best_marks(&stored(20, 13), &stored(22, 13)),
            MarksUpdate {
                marks_available: Some(22),
                marks_obtained: None
            }
        );
    }

    #[test]
    fn test_parse_scanned_on_offset() {
        assert_eq!(
            parse_scanned_on("2017-12-04T12:12:10+11:00").unwrap(),
            Utc.with_ymd_and_hms(2017, 12, 4, 1, 12, 10).unwrap()
        );
    }

    #[test]
    fn test_parse_scanned_on_without_offset_is_utc() {
        assert_eq!(
            parse_scanned_on("2017-12-04T12:12:10").unwrap(),
            Utc.with_ymd_and_hms(2017, 12, 4, 12, 12, 10).unwrap()
        );
    }

    #[test]
    fn test_parse_scanned_on_rejects_garbage() {
        assert!(matches!(
            parse_scanned_on("yesterday"),
            Err(ImportError::InvalidTimestamp(_))
        ));
    }
}

//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite key of a stored result: `"{test_id}-{student_id}"`
pub fn result_key(test_id: i64, student_id: i64) -> String {
    format!("{}-{}", test_id, student_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Stored result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TestResult {
    pub id: String,
    pub test_id: i64,
    pub student_id: i64,
    pub marks_available: i64,
    pub marks_obtained: i64,
    pub scanned_at: DateTime<Utc>,
}

impl TestResult {
    pub fn new(
        test_id: i64,
        student_id: i64,
        marks_available: i64,
        marks_obtained: i64,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: result_key(test_id, student_id),
            test_id,
            student_id,
            marks_available,
            marks_obtained,
            scanned_at,
        }
    }
}

/// Partial update of a stored result's marks
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarksUpdate {
    pub marks_available: Option<i64>,
    pub marks_obtained: Option<i64>,
}

impl MarksUpdate {
    pub fn is_empty(&self) -> bool {
        self.marks_available.is_none() && self.marks_obtained.is_none()
    }
}

/// Raw marks of one stored result, as read by the aggregate path
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ScorePair {
    pub marks_obtained: i64,
    pub marks_available: i64,
}

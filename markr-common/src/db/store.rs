//! Result store
//!
//! The persistence interface consumed by the import and aggregate paths.
//! Per-record writes go through a [`StoreTx`] so that the student upsert and
//! the result merge commit or roll back together.

use crate::db::models::{result_key, MarksUpdate, ScorePair, Student, TestResult};
use crate::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

/// Handle to the students/results tables
#[derive(Debug, Clone)]
pub struct ResultStore {
    pool: SqlitePool,
}

impl ResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction scoped to one unit of work
    pub async fn begin(&self) -> Result<StoreTx> {
        let tx = self.pool.begin().await?;
        Ok(StoreTx { tx })
    }

    /// Raw marks of every result recorded for `test_id`
    pub async fn get_results_by_test(&self, test_id: i64) -> Result<Vec<ScorePair>> {
        let rows = sqlx::query_as::<_, ScorePair>(
            "SELECT marks_obtained, marks_available FROM results WHERE test_id = ?",
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every stored result, ordered by key
    pub async fn list_results(&self) -> Result<Vec<TestResult>> {
        let rows = sqlx::query_as::<_, TestResult>(
            r#"
            SELECT id, test_id, student_id, marks_available, marks_obtained, scanned_at
            FROM results
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove all results and students
    ///
    /// Results go first because they reference students.
    pub async fn delete_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let results = sqlx::query("DELETE FROM results")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let students = sqlx::query("DELETE FROM students")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        debug!(results, students, "Deleted all stored rows");
        Ok(())
    }
}

/// One open store transaction
///
/// Dropping it without calling [`StoreTx::commit`] rolls back.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx {
    /// Insert the student, or overwrite the names of an existing one
    pub async fn upsert_student(&mut self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, first_name, last_name, created_at, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Insert the result unless its key already exists
    ///
    /// Returns `true` when a row was inserted.
    pub async fn insert_result_if_absent(&mut self, result: &TestResult) -> Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO results (
                id, test_id, student_id, marks_available, marks_obtained, scanned_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&result.id)
        .bind(result.test_id)
        .bind(result.student_id)
        .bind(result.marks_available)
        .bind(result.marks_obtained)
        .bind(result.scanned_at)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    pub async fn get_result_by_key(
        &mut self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Option<TestResult>> {
        let row = sqlx::query_as::<_, TestResult>(
            r#"
            SELECT id, test_id, student_id, marks_available, marks_obtained, scanned_at
            FROM results
            WHERE id = ?
            "#,
        )
        .bind(result_key(test_id, student_id))
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row)
    }

    /// Apply a partial marks update
    ///
    /// Returns `true` when a row was written. An empty update writes nothing.
    pub async fn update_result(
        &mut self,
        test_id: i64,
        student_id: i64,
        update: MarksUpdate,
    ) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let updated = sqlx::query(
            r#"
            UPDATE results SET
                marks_available = COALESCE(?, marks_available),
                marks_obtained = COALESCE(?, marks_obtained),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(update.marks_available)
        .bind(update.marks_obtained)
        .bind(result_key(test_id, student_id))
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

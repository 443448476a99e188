//! Submission repository
//!
//! One submission per (assignment, student). Handing in again replaces the
//! previous content until the submission is graded.

use chrono::{DateTime, Utc};
use lms_core::models::{Body, DueDate, GradeInput};
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::uploads::StoredFile;

/// Submission record from database
#[derive(Debug, Clone, FromRow)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub body: Option<String>,
    pub file_name: Option<String>,
    pub stored_name: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }
}

/// Submission with the student's name, for the instructor's grading list
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionWithStudent {
    pub id: i64,
    pub student_id: i64,
    pub username: String,
    pub name: Option<String>,
    pub body: Option<String>,
    pub file_name: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

impl SubmissionWithStudent {
    pub fn is_late(&self) -> bool {
        is_late(self.due_at, self.submitted_at)
    }
}

/// One row of a student's grade overview
#[derive(Debug, Clone, FromRow)]
pub struct GradeRow {
    pub submission_id: i64,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub course_id: i64,
    pub course_code: String,
    pub course_title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl GradeRow {
    pub fn is_late(&self) -> bool {
        is_late(self.due_at, self.submitted_at)
    }
}

fn is_late(due_at: Option<DateTime<Utc>>, submitted_at: DateTime<Utc>) -> bool {
    due_at
        .map(DueDate::from_datetime)
        .is_some_and(|due| due.is_late(submitted_at))
}

const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, body, file_name, stored_name, submitted_at, score, feedback, graded_at";

/// Submission repository
pub struct SubmissionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubmissionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Hand in work, replacing an ungraded earlier submission.
    ///
    /// Returns the submission and, when an earlier attachment was replaced,
    /// its stored name so the caller can delete the file. A graded
    /// submission is final and yields `Conflict`.
    ///
    /// The insert runs first so the transaction holds SQLite's write lock
    /// before anything is read; a concurrent hand-in for the same pair waits
    /// and then takes the replace path.
    pub async fn submit(
        &self,
        assignment_id: i64,
        student_id: i64,
        body: Option<&Body>,
        file: Option<&StoredFile>,
    ) -> Result<(Submission, Option<String>), DbError> {
        let body = body.map(|b| b.as_str());
        let file_name = file.map(|f| f.file_name.as_str());
        let stored_name = file.map(|f| f.stored_name.as_str());
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO submissions (assignment_id, student_id, body, file_name, stored_name, submitted_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (assignment_id, student_id) DO NOTHING
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Submission>(&sql)
            .bind(assignment_id)
            .bind(student_id)
            .bind(body)
            .bind(file_name)
            .bind(stored_name)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    DbError::not_found("assignment", assignment_id)
                }
                _ => DbError::Sqlx(e),
            })?;

        if let Some(submission) = inserted {
            tx.commit().await?;
            return Ok((submission, None));
        }

        let (id, previous_file, score): (i64, Option<String>, Option<i64>) = sqlx::query_as(
            "SELECT id, stored_name, score FROM submissions WHERE assignment_id = $1 AND student_id = $2",
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        if score.is_some() {
            return Err(DbError::conflict(
                "this submission has already been graded and can no longer be changed",
            ));
        }

        let sql = format!(
            "UPDATE submissions
             SET body = $1, file_name = $2, stored_name = $3, submitted_at = $4
             WHERE id = $5
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Submission>(&sql)
            .bind(body)
            .bind(file_name)
            .bind(stored_name)
            .bind(now)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((updated, previous_file))
    }

    pub async fn get(&self, id: i64) -> Result<Submission, DbError> {
        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("submission", id))
    }

    pub async fn find(&self, assignment_id: i64, student_id: i64) -> Result<Option<Submission>, DbError> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = $1 AND student_id = $2"
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(assignment_id)
            .bind(student_id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Submissions for an assignment, by student username.
    pub async fn list_for_assignment(&self, assignment_id: i64) -> Result<Vec<SubmissionWithStudent>, DbError> {
        Ok(sqlx::query_as::<_, SubmissionWithStudent>(
            r#"
            SELECT
                s.id,
                s.student_id,
                u.username,
                u.name,
                s.body,
                s.file_name,
                s.submitted_at,
                a.due_at,
                s.score,
                s.feedback
            FROM submissions s
            JOIN users u ON u.id = s.student_id
            JOIN assignments a ON a.id = s.assignment_id
            WHERE s.assignment_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(assignment_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Record a score. Re-grading overwrites the previous grade.
    pub async fn grade(&self, id: i64, grade: &GradeInput) -> Result<Submission, DbError> {
        let sql = format!(
            "UPDATE submissions
             SET score = $1, feedback = $2, graded_at = $3
             WHERE id = $4
             RETURNING {SUBMISSION_COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&sql)
            .bind(i64::from(grade.score.get()))
            .bind(grade.feedback.as_ref().map(|f| f.as_str()))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("submission", id))
    }

    /// Everything a student has handed in, newest course activity first.
    pub async fn for_student(&self, student_id: i64) -> Result<Vec<GradeRow>, DbError> {
        Ok(sqlx::query_as::<_, GradeRow>(
            r#"
            SELECT
                s.id AS submission_id,
                a.id AS assignment_id,
                a.title AS assignment_title,
                c.id AS course_id,
                c.code AS course_code,
                c.title AS course_title,
                a.due_at,
                s.submitted_at,
                s.score,
                s.feedback,
                s.graded_at
            FROM submissions s
            JOIN assignments a ON a.id = s.assignment_id
            JOIN courses c ON c.id = a.course_id
            WHERE s.student_id = $1
            ORDER BY c.code, s.submitted_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool)
        .await?)
    }
}

//! Assignment repository

use chrono::{DateTime, Utc};
use lms_core::models::{DueDate, NewAssignment};
use sqlx::{FromRow, SqlitePool};

use super::DbError;

/// Assignment record from database
#[derive(Debug, Clone, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn due(&self) -> Option<DueDate> {
        self.due_at.map(DueDate::from_datetime)
    }

    /// Whether work handed in at `at` is past the due date.
    pub fn is_late(&self, at: DateTime<Utc>) -> bool {
        self.due().is_some_and(|due| due.is_late(at))
    }
}

/// Assignment joined with one student's submission state
#[derive(Debug, Clone, FromRow)]
pub struct StudentAssignment {
    pub id: i64,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
}

const ASSIGNMENT_COLUMNS: &str = "id, course_id, title, description, due_at, created_at";

/// Assignment repository
pub struct AssignmentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssignmentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, course_id: i64, assignment: &NewAssignment) -> Result<Assignment, DbError> {
        let sql = format!(
            "INSERT INTO assignments (course_id, title, description, due_at, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(course_id)
            .bind(assignment.title.as_str())
            .bind(assignment.description.as_ref().map(|d| d.as_str()))
            .bind(assignment.due.map(|d| d.as_datetime()))
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    DbError::not_found("course", course_id)
                }
                _ => DbError::Sqlx(e),
            })
    }

    pub async fn get(&self, id: i64) -> Result<Assignment, DbError> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("assignment", id))
    }

    /// Assignments without a due date sort last.
    pub async fn list_for_course(&self, course_id: i64) -> Result<Vec<Assignment>, DbError> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
             WHERE course_id = $1
             ORDER BY due_at IS NULL, due_at, id"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(course_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Course assignments with the given student's submission status.
    pub async fn list_for_student(&self, course_id: i64, student_id: i64) -> Result<Vec<StudentAssignment>, DbError> {
        Ok(sqlx::query_as::<_, StudentAssignment>(
            r#"
            SELECT a.id, a.title, a.due_at, s.submitted_at, s.score
            FROM assignments a
            LEFT JOIN submissions s ON s.assignment_id = a.id AND s.student_id = $2
            WHERE a.course_id = $1
            ORDER BY a.due_at IS NULL, a.due_at, a.id
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Delete an assignment; returns stored names of its submission files.
    pub async fn delete(&self, id: i64) -> Result<Vec<String>, DbError> {
        let mut tx = self.pool.begin().await?;

        let files: Vec<(String,)> = sqlx::query_as(
            "SELECT stored_name FROM submissions WHERE assignment_id = $1 AND stored_name IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("assignment", id));
        }

        tx.commit().await?;
        Ok(files.into_iter().map(|(name,)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::fixtures;
    use lms_core::models::AssignmentForm;

    fn assignment(title: &str, due: Option<&str>) -> NewAssignment {
        AssignmentForm {
            title: title.into(),
            description: None,
            due: due.map(Into::into),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn ordered_by_due_date_undated_last() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let repo = AssignmentRepo::new(&pool);

        repo.create(course.id, &assignment("Open", None)).await.unwrap();
        repo.create(course.id, &assignment("Late", Some("2030-06-01"))).await.unwrap();
        repo.create(course.id, &assignment("Soon", Some("2030-01-01T09:00"))).await.unwrap();

        let titles: Vec<_> = repo
            .list_for_course(course.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, ["Soon", "Late", "Open"]);
    }

    #[tokio::test]
    async fn due_date_round_trips() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let repo = AssignmentRepo::new(&pool);

        let new = assignment("Essay", Some("2030-03-15T17:45"));
        let created = repo.create(course.id, &new).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.due(), new.due);
    }

    #[tokio::test]
    async fn lateness_follows_due_date() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let repo = AssignmentRepo::new(&pool);

        let dated = repo.create(course.id, &assignment("Essay", Some("2030-03-15T17:45"))).await.unwrap();
        let due = dated.due_at.unwrap();
        assert!(!dated.is_late(due));
        assert!(dated.is_late(due + chrono::Duration::seconds(1)));

        let open = repo.create(course.id, &assignment("Open", None)).await.unwrap();
        assert!(!open.is_late(Utc::now()));
    }

    #[tokio::test]
    async fn create_for_missing_course() {
        let pool = fixtures::pool().await;
        let err = AssignmentRepo::new(&pool)
            .create(404, &assignment("Ghost", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "course", .. }));
    }

    #[tokio::test]
    async fn student_view_shows_submission_state() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let student = fixtures::user(&pool, "stu", "student").await;
        let repo = AssignmentRepo::new(&pool);
        let a = repo.create(course.id, &assignment("Essay", None)).await.unwrap();

        let rows = repo.list_for_student(course.id, student.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].submitted_at.is_none());

        crate::db::SubmissionRepo::new(&pool)
            .submit(a.id, student.id, None, Some(&crate::uploads::StoredFile {
                file_name: "essay.txt".into(),
                stored_name: "x.txt".into(),
            }))
            .await
            .unwrap();

        let rows = repo.list_for_student(course.id, student.id).await.unwrap();
        assert!(rows[0].submitted_at.is_some());
        assert!(rows[0].score.is_none());
    }
}

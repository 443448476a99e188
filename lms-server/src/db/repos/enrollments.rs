//! Enrollment repository

use chrono::Utc;
use lms_core::models::Role;
use sqlx::SqlitePool;

use super::{DbError, User};

/// Enrollment repository
pub struct EnrollmentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EnrollmentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Enroll a student. Enrolling twice is a no-op.
    pub async fn enroll(&self, course_id: i64, student_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let course_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;
        if !course_exists.0 {
            return Err(DbError::not_found("course", course_id));
        }

        let role: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;
        match role {
            None => return Err(DbError::not_found("user", student_id)),
            Some((role,)) if role != Role::Student.as_str() => {
                return Err(DbError::conflict("only students can enroll in a course"));
            }
            Some(_) => {}
        }

        sqlx::query(
            r#"
            INSERT INTO enrollments (course_id, student_id, enrolled_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, student_id) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Leave a course. Returns whether the student was enrolled.
    ///
    /// Submissions are kept so grades survive re-enrollment.
    pub async fn unenroll(&self, course_id: i64, student_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE course_id = $1 AND student_id = $2")
            .bind(course_id)
            .bind(student_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_enrolled(&self, course_id: i64, student_id: i64) -> Result<bool, DbError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Course ids a student is enrolled in (catalog page).
    pub async fn course_ids(&self, student_id: i64) -> Result<Vec<i64>, DbError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT course_id FROM enrollments WHERE student_id = $1")
                .bind(student_id)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn students(&self, course_id: i64) -> Result<Vec<User>, DbError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password, u.role, u.name, u.email, u.phone_nr, u.age, u.created_at
            FROM users u
            JOIN enrollments e ON e.student_id = u.id
            WHERE e.course_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?)
    }
}

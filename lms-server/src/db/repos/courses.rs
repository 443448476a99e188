//! Course repository
//!
//! Courses plus the instructor assignment table. Listing joins in the
//! instructor and student counts in a single query.

use chrono::{DateTime, Utc};
use lms_core::models::{NewCourse, Role};
use sqlx::{FromRow, SqlitePool};

use super::{unique_or, DbError, User};

/// Course record from database
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Course with membership counts for list pages
#[derive(Debug, Clone, FromRow)]
pub struct CourseSummary {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub instructor_count: i64,
    pub student_count: i64,
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        c.id,
        c.code,
        c.title,
        c.description,
        c.created_at,
        (SELECT COUNT(*) FROM course_instructors ci WHERE ci.course_id = c.id) AS instructor_count,
        (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS student_count
    FROM courses c
"#;

/// Course repository
pub struct CourseRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CourseRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a course. A taken code is a `Conflict`.
    pub async fn create(&self, course: &NewCourse) -> Result<Course, DbError> {
        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (code, title, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, title, description, created_at
            "#,
        )
        .bind(course.code.as_str())
        .bind(course.title.as_str())
        .bind(course.description.as_ref().map(|d| d.as_str()))
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| unique_or(e, format!("course code '{}' already exists", course.code.as_str())))
    }

    pub async fn get(&self, id: i64) -> Result<Course, DbError> {
        sqlx::query_as::<_, Course>(
            "SELECT id, code, title, description, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("course", id))
    }

    /// Every course, by code.
    pub async fn list_all(&self) -> Result<Vec<CourseSummary>, DbError> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY c.code");
        Ok(sqlx::query_as::<_, CourseSummary>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Courses an instructor is assigned to.
    pub async fn list_for_instructor(&self, instructor_id: i64) -> Result<Vec<CourseSummary>, DbError> {
        let sql = format!(
            "{SUMMARY_SELECT}
             JOIN course_instructors mine ON mine.course_id = c.id AND mine.instructor_id = $1
             ORDER BY c.code"
        );
        Ok(sqlx::query_as::<_, CourseSummary>(&sql)
            .bind(instructor_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Courses a student is enrolled in.
    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<CourseSummary>, DbError> {
        let sql = format!(
            "{SUMMARY_SELECT}
             JOIN enrollments mine ON mine.course_id = c.id AND mine.student_id = $1
             ORDER BY c.code"
        );
        Ok(sqlx::query_as::<_, CourseSummary>(&sql)
            .bind(student_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Delete a course and everything under it.
    ///
    /// Returns the stored upload names that belonged to the course so the
    /// caller can remove the files.
    pub async fn delete(&self, id: i64) -> Result<Vec<String>, DbError> {
        let mut tx = self.pool.begin().await?;

        let files: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT stored_name FROM materials
            WHERE course_id = $1 AND stored_name IS NOT NULL
            UNION ALL
            SELECT s.stored_name FROM submissions s
            JOIN assignments a ON a.id = s.assignment_id
            WHERE a.course_id = $1 AND s.stored_name IS NOT NULL
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("course", id));
        }

        tx.commit().await?;
        Ok(files.into_iter().map(|(name,)| name).collect())
    }

    /// Assign an instructor to a course. Assigning twice is a no-op.
    ///
    /// The user must exist and hold the instructor role.
    pub async fn assign_instructor(&self, course_id: i64, user_id: i64) -> Result<(), DbError> {
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
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        match role {
            None => return Err(DbError::not_found("user", user_id)),
            Some((role,)) if role != Role::Instructor.as_str() => {
                return Err(DbError::conflict("only instructors can be assigned to a course"));
            }
            Some(_) => {}
        }

        sqlx::query(
            r#"
            INSERT INTO course_instructors (course_id, instructor_id, assigned_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, instructor_id) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove an instructor from a course. Returns whether a row was removed.
    pub async fn unassign_instructor(&self, course_id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM course_instructors WHERE course_id = $1 AND instructor_id = $2",
        )
        .bind(course_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn instructors(&self, course_id: i64) -> Result<Vec<User>, DbError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password, u.role, u.name, u.email, u.phone_nr, u.age, u.created_at
            FROM users u
            JOIN course_instructors ci ON ci.instructor_id = u.id
            WHERE ci.course_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn is_instructor(&self, course_id: i64, user_id: i64) -> Result<bool, DbError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM course_instructors WHERE course_id = $1 AND instructor_id = $2)",
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{fixtures, EnrollmentRepo};

    #[tokio::test]
    async fn create_uppercases_and_rejects_duplicates() {
        let pool = fixtures::pool().await;
        let repo = CourseRepo::new(&pool);

        let course = repo
            .create(&fixtures::new_course("cs-101", "Intro"))
            .await
            .unwrap();
        assert_eq!(course.code, "CS-101");

        let err = repo
            .create(&fixtures::new_course("CS-101", "Again"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn list_all_counts_members() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "BIO-1").await;
        fixtures::course(&pool, "ART-1").await;
        let teacher = fixtures::user(&pool, "teach", "instructor").await;
        let s1 = fixtures::user(&pool, "stu1", "student").await;
        let s2 = fixtures::user(&pool, "stu2", "student").await;

        let repo = CourseRepo::new(&pool);
        repo.assign_instructor(course.id, teacher.id).await.unwrap();
        EnrollmentRepo::new(&pool).enroll(course.id, s1.id).await.unwrap();
        EnrollmentRepo::new(&pool).enroll(course.id, s2.id).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "ART-1");
        assert_eq!(all[1].instructor_count, 1);
        assert_eq!(all[1].student_count, 2);
    }

    #[tokio::test]
    async fn assign_is_idempotent_and_scoped() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let other = fixtures::course(&pool, "CS-2").await;
        let teacher = fixtures::user(&pool, "teach", "instructor").await;

        let repo = CourseRepo::new(&pool);
        repo.assign_instructor(course.id, teacher.id).await.unwrap();
        repo.assign_instructor(course.id, teacher.id).await.unwrap();

        assert_eq!(repo.instructors(course.id).await.unwrap().len(), 1);
        assert!(repo.is_instructor(course.id, teacher.id).await.unwrap());
        assert!(!repo.is_instructor(other.id, teacher.id).await.unwrap());

        let mine = repo.list_for_instructor(teacher.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, course.id);
    }

    #[tokio::test]
    async fn only_instructors_can_be_assigned() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let student = fixtures::user(&pool, "stu", "student").await;

        let err = CourseRepo::new(&pool)
            .assign_instructor(course.id, student.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        let err = CourseRepo::new(&pool)
            .assign_instructor(course.id, 999)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
    }

    #[tokio::test]
    async fn unassign_reports_removal() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let teacher = fixtures::user(&pool, "teach", "instructor").await;

        let repo = CourseRepo::new(&pool);
        repo.assign_instructor(course.id, teacher.id).await.unwrap();
        assert!(repo.unassign_instructor(course.id, teacher.id).await.unwrap());
        assert!(!repo.unassign_instructor(course.id, teacher.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_cascades_and_reports_missing() {
        let pool = fixtures::pool().await;
        let course = fixtures::course(&pool, "CS-1").await;
        let teacher = fixtures::user(&pool, "teach", "instructor").await;

        let repo = CourseRepo::new(&pool);
        repo.assign_instructor(course.id, teacher.id).await.unwrap();
        assert!(repo.delete(course.id).await.unwrap().is_empty());
        assert!(repo.list_for_instructor(teacher.id).await.unwrap().is_empty());

        let err = repo.delete(course.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Lets UNIQUE constraints decide duplicates (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod materials;
pub mod submissions;
pub mod users;

pub use assignments::{Assignment, AssignmentRepo, StudentAssignment};
pub use courses::{Course, CourseRepo, CourseSummary};
pub use enrollments::EnrollmentRepo;
pub use materials::{Material, MaterialRepo};
pub use submissions::{GradeRow, Submission, SubmissionRepo, SubmissionWithStudent};
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}

/// Map a UNIQUE violation to `Conflict`, pass everything else through.
pub(crate) fn unique_or(err: sqlx::Error, reason: impl Into<String>) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DbError::conflict(reason),
        _ => DbError::Sqlx(err),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared setup for repository tests

    use lms_core::models::{NewCourse, NewUser, NewUserForm, NewCourseForm};
    use sqlx::SqlitePool;

    use super::{Course, CourseRepo, User, UserRepo};
    use crate::db::{create_memory_pool, migrations};

    pub async fn pool() -> SqlitePool {
        let pool = create_memory_pool().await.expect("pool");
        migrations::run(&pool).await.expect("migrations");
        pool
    }

    pub fn new_user(username: &str, role: &str) -> NewUser {
        NewUserForm {
            username: username.into(),
            password: format!("{username}-pw"),
            role: role.into(),
            name: None,
        }
        .validate()
        .expect("valid user")
    }

    pub fn new_course(code: &str, title: &str) -> NewCourse {
        NewCourseForm {
            code: code.into(),
            title: title.into(),
            description: None,
        }
        .validate()
        .expect("valid course")
    }

    pub async fn user(pool: &SqlitePool, username: &str, role: &str) -> User {
        UserRepo::new(pool)
            .create(&new_user(username, role))
            .await
            .expect("create user")
    }

    pub async fn course(pool: &SqlitePool, code: &str) -> Course {
        CourseRepo::new(pool)
            .create(&new_course(code, &format!("Course {code}")))
            .await
            .expect("create course")
    }
}

//! Course membership checks

use lms_core::Role;
use sqlx::SqlitePool;

use super::error::ApiError;
use crate::db::{Course, CourseRepo, EnrollmentRepo, User};

/// How a user relates to a course they may open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Administrators see every course read-only
    Admin,
    /// Assigned instructor
    Teacher,
    /// Enrolled student
    Student,
}

/// Load a course and check that `user` belongs to it.
pub async fn course_member(pool: &SqlitePool, user: &User, course_id: i64) -> Result<(Course, Membership), ApiError> {
    let course = CourseRepo::new(pool).get(course_id).await?;

    let membership = match user.role {
        Role::Admin => Membership::Admin,
        Role::Instructor => {
            if !CourseRepo::new(pool).is_instructor(course_id, user.id).await? {
                return Err(ApiError::forbidden("You do not teach this course."));
            }
            Membership::Teacher
        }
        Role::Student => {
            if !EnrollmentRepo::new(pool).is_enrolled(course_id, user.id).await? {
                return Err(ApiError::forbidden("You are not enrolled in this course."));
            }
            Membership::Student
        }
    };

    Ok((course, membership))
}

/// Load a course the user must teach.
pub async fn course_teacher(pool: &SqlitePool, user: &User, course_id: i64) -> Result<Course, ApiError> {
    match course_member(pool, user, course_id).await? {
        (course, Membership::Teacher) => Ok(course),
        _ => Err(ApiError::forbidden("Only instructors of this course can do that.")),
    }
}

//! Administration: users, courses and instructor assignment

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use lms_core::models::{NewCourseForm, NewUserForm};
use lms_core::Role;

use crate::db::{CourseRepo, EnrollmentRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, PathIds};
use crate::http::flash;
use crate::session::Flash;
use crate::state::AppState;
use crate::views::{self, Page};

#[derive(Debug, Deserialize)]
pub struct AssignInstructorForm {
    #[serde(default)]
    pub instructor_id: String,
}

/// GET /admin/users
async fn list_users(State(state): State<Arc<AppState>>, AdminUser(me): AdminUser) -> Result<Html<String>, ApiError> {
    let users = UserRepo::new(&state.pool).list(None).await?;
    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::admin::users(&Page::new(&me.user, &flash), &users)))
}

/// POST /admin/users
async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    Form(form): Form<NewUserForm>,
) -> Result<Response, ApiError> {
    let result = match form.validate() {
        Ok(new_user) => UserRepo::new(&state.pool)
            .create(&new_user)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e.into()),
    };

    let flash = flash::outcome(result, |user| {
        tracing::info!(admin_id = me.user.id, user_id = user.id, role = %user.role, "user created");
        Flash::success(format!("Created {} account '{}'.", user.role, user.username))
    })?;

    Ok(flash::redirect(&state, Some(me.token), "/admin/users", flash).await)
}

/// POST /admin/users/{id}/delete
async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    PathIds(user_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    if user_id == me.user.id {
        let flash = Flash::error("You cannot delete your own account.");
        return Ok(flash::redirect(&state, Some(me.token), "/admin/users", flash).await);
    }

    let users = UserRepo::new(&state.pool);
    let user = users.get(user_id).await?;
    let files = users.delete(user_id).await?;

    state.uploads.remove_all(&files).await;
    state.sessions.destroy_user(user_id).await;
    tracing::info!(admin_id = me.user.id, user_id, files = files.len(), "user deleted");

    let flash = Flash::success(format!("Deleted account '{}'.", user.username));
    Ok(flash::redirect(&state, Some(me.token), "/admin/users", flash).await)
}

/// GET /admin/courses
async fn list_courses(State(state): State<Arc<AppState>>, AdminUser(me): AdminUser) -> Result<Html<String>, ApiError> {
    let courses = CourseRepo::new(&state.pool).list_all().await?;
    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::admin::courses(&Page::new(&me.user, &flash), &courses)))
}

/// POST /admin/courses
async fn create_course(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    Form(form): Form<NewCourseForm>,
) -> Result<Response, ApiError> {
    let result = match form.validate() {
        Ok(course) => CourseRepo::new(&state.pool)
            .create(&course)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e.into()),
    };

    let flash = flash::outcome(result, |course| {
        tracing::info!(admin_id = me.user.id, course_id = course.id, code = %course.code, "course created");
        Flash::success(format!("Created course {}.", course.code))
    })?;

    Ok(flash::redirect(&state, Some(me.token), "/admin/courses", flash).await)
}

/// GET /admin/courses/{id}
async fn course_detail(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    PathIds(course_id): PathIds<i64>,
) -> Result<Html<String>, ApiError> {
    let courses = CourseRepo::new(&state.pool);
    let course = courses.get(course_id).await?;
    let instructors = courses.instructors(course_id).await?;
    let candidates: Vec<_> = UserRepo::new(&state.pool)
        .list(Some(Role::Instructor))
        .await?
        .into_iter()
        .filter(|u| instructors.iter().all(|i| i.id != u.id))
        .collect();
    let students = EnrollmentRepo::new(&state.pool).students(course_id).await?;

    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::admin::course_detail(
        &Page::new(&me.user, &flash),
        &course,
        &instructors,
        &candidates,
        &students,
    )))
}

/// POST /admin/courses/{id}/delete
async fn delete_course(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    PathIds(course_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let courses = CourseRepo::new(&state.pool);
    let course = courses.get(course_id).await?;
    let files = courses.delete(course_id).await?;

    state.uploads.remove_all(&files).await;
    tracing::info!(admin_id = me.user.id, course_id, files = files.len(), "course deleted");

    let flash = Flash::success(format!("Deleted course {}.", course.code));
    Ok(flash::redirect(&state, Some(me.token), "/admin/courses", flash).await)
}

/// POST /admin/courses/{id}/instructors
async fn assign_instructor(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    PathIds(course_id): PathIds<i64>,
    Form(form): Form<AssignInstructorForm>,
) -> Result<Response, ApiError> {
    let back = format!("/admin/courses/{course_id}");

    let result = match form.instructor_id.trim().parse::<i64>() {
        Ok(user_id) => CourseRepo::new(&state.pool)
            .assign_instructor(course_id, user_id)
            .await
            .map(|()| user_id)
            .map_err(ApiError::from),
        Err(_) => Err(ApiError::BadRequest {
            message: "Choose an instructor.".into(),
        }),
    };

    let flash = flash::outcome(result, |user_id| {
        tracing::info!(admin_id = me.user.id, course_id, user_id, "instructor assigned");
        Flash::success("Instructor assigned.")
    })?;

    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// POST /admin/courses/{id}/instructors/{uid}/remove
async fn remove_instructor(
    State(state): State<Arc<AppState>>,
    AdminUser(me): AdminUser,
    PathIds((course_id, user_id)): PathIds<(i64, i64)>,
) -> Result<Response, ApiError> {
    let removed = CourseRepo::new(&state.pool)
        .unassign_instructor(course_id, user_id)
        .await?;

    let flash = if removed {
        tracing::info!(admin_id = me.user.id, course_id, user_id, "instructor removed");
        Flash::success("Instructor removed.")
    } else {
        Flash::info("That instructor was not assigned to this course.")
    };

    let back = format!("/admin/courses/{course_id}");
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// Administration routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{id}/delete", post(delete_user))
        .route("/admin/courses", get(list_courses).post(create_course))
        .route("/admin/courses/{id}", get(course_detail))
        .route("/admin/courses/{id}/delete", post(delete_course))
        .route("/admin/courses/{id}/instructors", post(assign_instructor))
        .route("/admin/courses/{id}/instructors/{uid}/remove", post(remove_instructor))
}

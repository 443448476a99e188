//! Course catalog, enrollment, course pages, materials and assignments

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::{Html, Response},
    routing::{get, post},
    Form, Router,
};

use lms_core::models::{AssignmentForm, MaterialForm};
use lms_core::Role;

use crate::db::{AssignmentRepo, CourseRepo, EnrollmentRepo, Material, MaterialRepo};
use crate::http::access::{course_member, course_teacher, Membership};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, InstructorUser, PathIds, StudentUser};
use crate::http::flash;
use crate::http::multipart::MultipartForm;
use crate::session::Flash;
use crate::state::AppState;
use crate::views::{self, courses::CourseView, Page};

/// GET /courses
async fn list_courses(State(state): State<Arc<AppState>>, me: CurrentUser) -> Result<Html<String>, ApiError> {
    let courses = CourseRepo::new(&state.pool);
    let flash = flash::take(&state, Some(me.token)).await;
    let page = Page::new(&me.user, &flash);

    let html = match me.user.role {
        Role::Admin => views::courses::list(&page, "All courses", &courses.list_all().await?, None),
        Role::Instructor => views::courses::list(
            &page,
            "Your courses",
            &courses.list_for_instructor(me.user.id).await?,
            None,
        ),
        Role::Student => {
            let enrolled = EnrollmentRepo::new(&state.pool).course_ids(me.user.id).await?;
            views::courses::list(&page, "Course catalog", &courses.list_all().await?, Some(&enrolled))
        }
    };

    Ok(Html(html))
}

/// POST /courses/{id}/enroll
async fn enroll(
    State(state): State<Arc<AppState>>,
    StudentUser(me): StudentUser,
    PathIds(course_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let course = CourseRepo::new(&state.pool).get(course_id).await?;
    EnrollmentRepo::new(&state.pool).enroll(course_id, me.user.id).await?;
    tracing::info!(user_id = me.user.id, course_id, "enrolled");

    let flash = Flash::success(format!("Enrolled in {}.", course.code));
    Ok(flash::redirect(&state, Some(me.token), "/courses", flash).await)
}

/// POST /courses/{id}/unenroll
async fn unenroll(
    State(state): State<Arc<AppState>>,
    StudentUser(me): StudentUser,
    PathIds(course_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let course = CourseRepo::new(&state.pool).get(course_id).await?;
    let removed = EnrollmentRepo::new(&state.pool).unenroll(course_id, me.user.id).await?;

    let flash = if removed {
        tracing::info!(user_id = me.user.id, course_id, "unenrolled");
        Flash::success(format!("Left {}.", course.code))
    } else {
        Flash::info(format!("You were not enrolled in {}.", course.code))
    };
    Ok(flash::redirect(&state, Some(me.token), "/courses", flash).await)
}

/// GET /courses/{id}
async fn course_page(
    State(state): State<Arc<AppState>>,
    me: CurrentUser,
    PathIds(course_id): PathIds<i64>,
) -> Result<Html<String>, ApiError> {
    let (course, membership) = course_member(&state.pool, &me.user, course_id).await?;

    let instructors = CourseRepo::new(&state.pool).instructors(course_id).await?;
    let materials = MaterialRepo::new(&state.pool).list_for_course(course_id).await?;
    let assignments = AssignmentRepo::new(&state.pool);
    let (all, progress) = match membership {
        Membership::Student => (Vec::new(), Some(assignments.list_for_student(course_id, me.user.id).await?)),
        _ => (assignments.list_for_course(course_id).await?, None),
    };

    let view = CourseView {
        course: &course,
        instructors: &instructors,
        materials: &materials,
        assignments: &all,
        progress: progress.as_deref(),
        can_edit: membership == Membership::Teacher,
    };

    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::courses::detail(&Page::new(&me.user, &flash), &view)))
}

/// Store the attachment first; drop it again if the row cannot be written.
async fn post_material(
    state: &AppState,
    author_id: i64,
    course_id: i64,
    multipart: Multipart,
) -> Result<Material, ApiError> {
    let form = MultipartForm::read(multipart, state.uploads.max_bytes()).await?;
    let material = MaterialForm {
        title: form.text("title").unwrap_or_default(),
        body: form.text("body"),
    }
    .validate()?;

    let stored = match &form.file {
        Some(file) => Some(state.uploads.save(&file.file_name, &file.bytes).await?),
        None => None,
    };

    match MaterialRepo::new(&state.pool)
        .create(course_id, author_id, &material, stored.as_ref())
        .await
    {
        Ok(material) => Ok(material),
        Err(e) => {
            if let Some(stored) = &stored {
                state.uploads.remove(&stored.stored_name).await;
            }
            Err(e.into())
        }
    }
}

/// POST /courses/{id}/materials (multipart: title, body, file)
async fn create_material(
    State(state): State<Arc<AppState>>,
    InstructorUser(me): InstructorUser,
    PathIds(course_id): PathIds<i64>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    course_teacher(&state.pool, &me.user, course_id).await?;
    let back = format!("/courses/{course_id}");

    let result = post_material(&state, me.user.id, course_id, multipart).await;

    let flash = flash::outcome(result, |material| {
        tracing::info!(user_id = me.user.id, course_id, material_id = material.id, "material posted");
        Flash::success(format!("Posted '{}'.", material.title))
    })?;

    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// POST /materials/{id}/delete
async fn delete_material(
    State(state): State<Arc<AppState>>,
    InstructorUser(me): InstructorUser,
    PathIds(material_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let materials = MaterialRepo::new(&state.pool);
    let material = materials.get(material_id).await?;
    course_teacher(&state.pool, &me.user, material.course_id).await?;

    let deleted = materials.delete(material_id).await?;
    if let Some(stored) = &deleted.stored_name {
        state.uploads.remove(stored).await;
    }
    tracing::info!(user_id = me.user.id, material_id, "material deleted");

    let back = format!("/courses/{}", deleted.course_id);
    let flash = Flash::success(format!("Deleted '{}'.", deleted.title));
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// POST /courses/{id}/assignments
async fn create_assignment(
    State(state): State<Arc<AppState>>,
    InstructorUser(me): InstructorUser,
    PathIds(course_id): PathIds<i64>,
    Form(form): Form<AssignmentForm>,
) -> Result<Response, ApiError> {
    course_teacher(&state.pool, &me.user, course_id).await?;

    let result = match form.validate() {
        Ok(assignment) => AssignmentRepo::new(&state.pool)
            .create(course_id, &assignment)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e.into()),
    };

    let flash = flash::outcome(result, |assignment| {
        tracing::info!(user_id = me.user.id, course_id, assignment_id = assignment.id, "assignment created");
        Flash::success(format!("Created assignment '{}'.", assignment.title))
    })?;

    let back = format!("/courses/{course_id}");
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(course_page))
        .route("/courses/{id}/enroll", post(enroll))
        .route("/courses/{id}/unenroll", post(unenroll))
        .route("/courses/{id}/materials", post(create_material))
        .route("/courses/{id}/assignments", post(create_assignment))
        .route("/materials/{id}/delete", post(delete_material))
}

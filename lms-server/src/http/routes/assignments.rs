//! Assignment pages, submissions and grading

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::{Html, Response},
    routing::{get, post},
    Form, Router,
};

use lms_core::models::{GradeForm, SubmissionForm};

use crate::db::{AssignmentRepo, Submission, SubmissionRepo};
use crate::http::access::{course_member, course_teacher, Membership};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, InstructorUser, PathIds, StudentUser};
use crate::http::flash;
use crate::http::multipart::MultipartForm;
use crate::session::Flash;
use crate::state::AppState;
use crate::views::{self, assignments::Viewer, Page};

/// GET /assignments/{id}
async fn assignment_page(
    State(state): State<Arc<AppState>>,
    me: CurrentUser,
    PathIds(assignment_id): PathIds<i64>,
) -> Result<Html<String>, ApiError> {
    let assignment = AssignmentRepo::new(&state.pool).get(assignment_id).await?;
    let (course, membership) = course_member(&state.pool, &me.user, assignment.course_id).await?;
    let submissions = SubmissionRepo::new(&state.pool);

    let own;
    let all;
    let viewer = match membership {
        Membership::Student => {
            own = submissions.find(assignment_id, me.user.id).await?;
            Viewer::Student { own: own.as_ref() }
        }
        Membership::Teacher | Membership::Admin => {
            all = submissions.list_for_assignment(assignment_id).await?;
            Viewer::Staff {
                submissions: &all,
                can_grade: membership == Membership::Teacher,
            }
        }
    };

    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::assignments::detail(
        &Page::new(&me.user, &flash),
        &course,
        &assignment,
        &viewer,
    )))
}

/// Save the attachment, then record the submission. Whichever file loses
/// (the new one on failure, the replaced one on success) is removed.
async fn hand_in(
    state: &AppState,
    assignment_id: i64,
    student_id: i64,
    multipart: Multipart,
) -> Result<Submission, ApiError> {
    let form = MultipartForm::read(multipart, state.uploads.max_bytes()).await?;
    let text = SubmissionForm {
        text: form.text("text"),
    }
    .validate(form.file.is_some())?;

    let stored = match &form.file {
        Some(file) => Some(state.uploads.save(&file.file_name, &file.bytes).await?),
        None => None,
    };

    let result = SubmissionRepo::new(&state.pool)
        .submit(assignment_id, student_id, text.as_ref(), stored.as_ref())
        .await;

    match result {
        Ok((submission, replaced)) => {
            if let Some(replaced) = replaced {
                state.uploads.remove(&replaced).await;
            }
            Ok(submission)
        }
        Err(e) => {
            if let Some(stored) = &stored {
                state.uploads.remove(&stored.stored_name).await;
            }
            Err(e.into())
        }
    }
}

/// POST /assignments/{id}/submit (multipart: text, file)
async fn submit(
    State(state): State<Arc<AppState>>,
    StudentUser(me): StudentUser,
    PathIds(assignment_id): PathIds<i64>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let assignment = AssignmentRepo::new(&state.pool).get(assignment_id).await?;
    course_member(&state.pool, &me.user, assignment.course_id).await?;

    let result = hand_in(&state, assignment_id, me.user.id, multipart).await;

    let flash = flash::outcome(result, |submission| {
        let late = assignment.is_late(submission.submitted_at);
        tracing::info!(
            user_id = me.user.id,
            assignment_id,
            submission_id = submission.id,
            late,
            "submission received"
        );
        if late {
            Flash::info("Submission received after the due date; it is marked late.")
        } else {
            Flash::success("Submission received.")
        }
    })?;

    let back = format!("/assignments/{assignment_id}");
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// POST /assignments/{id}/delete
async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    InstructorUser(me): InstructorUser,
    PathIds(assignment_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let assignments = AssignmentRepo::new(&state.pool);
    let assignment = assignments.get(assignment_id).await?;
    course_teacher(&state.pool, &me.user, assignment.course_id).await?;

    let files = assignments.delete(assignment_id).await?;
    state.uploads.remove_all(&files).await;
    tracing::info!(user_id = me.user.id, assignment_id, files = files.len(), "assignment deleted");

    let back = format!("/courses/{}", assignment.course_id);
    let flash = Flash::success(format!("Deleted assignment '{}'.", assignment.title));
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// POST /submissions/{id}/grade
async fn grade(
    State(state): State<Arc<AppState>>,
    InstructorUser(me): InstructorUser,
    PathIds(submission_id): PathIds<i64>,
    Form(form): Form<GradeForm>,
) -> Result<Response, ApiError> {
    let submissions = SubmissionRepo::new(&state.pool);
    let submission = submissions.get(submission_id).await?;
    let assignment = AssignmentRepo::new(&state.pool).get(submission.assignment_id).await?;
    course_teacher(&state.pool, &me.user, assignment.course_id).await?;

    let result = match form.validate() {
        Ok(input) => submissions.grade(submission_id, &input).await.map_err(ApiError::from),
        Err(e) => Err(e.into()),
    };

    let flash = flash::outcome(result, |graded| {
        tracing::info!(
            user_id = me.user.id,
            submission_id,
            student_id = graded.student_id,
            score = graded.score,
            "submission graded"
        );
        Flash::success("Grade saved.")
    })?;

    let back = format!("/assignments/{}", assignment.id);
    Ok(flash::redirect(&state, Some(me.token), &back, flash).await)
}

/// GET /grades
async fn grades(State(state): State<Arc<AppState>>, StudentUser(me): StudentUser) -> Result<Html<String>, ApiError> {
    let rows = SubmissionRepo::new(&state.pool).for_student(me.user.id).await?;
    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::assignments::grades(&Page::new(&me.user, &flash), &rows)))
}

/// Assignment, submission and grade routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assignments/{id}", get(assignment_page))
        .route("/assignments/{id}/submit", post(submit))
        .route("/assignments/{id}/delete", post(delete_assignment))
        .route("/submissions/{id}/grade", post(grade))
        .route("/grades", get(grades))
}

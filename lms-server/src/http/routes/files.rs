//! Attachment downloads

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use lms_core::Role;

use crate::db::{AssignmentRepo, CourseRepo, MaterialRepo, SubmissionRepo};
use crate::http::access::course_member;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, PathIds};
use crate::state::AppState;

/// `Content-Disposition` with an ASCII fallback name and the UTF-8 original.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

async fn send_file(state: &AppState, stored_name: &str, file_name: &str) -> Result<Response, ApiError> {
    let bytes = state.uploads.read(stored_name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// GET /files/materials/{id}
async fn material_file(
    State(state): State<Arc<AppState>>,
    me: CurrentUser,
    PathIds(material_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let material = MaterialRepo::new(&state.pool).get(material_id).await?;
    course_member(&state.pool, &me.user, material.course_id).await?;

    match (&material.stored_name, &material.file_name) {
        (Some(stored), Some(name)) => send_file(&state, stored, name).await,
        _ => Err(ApiError::NotFound {
            resource: "attachment",
            id: material_id.to_string(),
        }),
    }
}

/// GET /files/submissions/{id}
///
/// The submitting student, instructors of the course and administrators
/// may download.
async fn submission_file(
    State(state): State<Arc<AppState>>,
    me: CurrentUser,
    PathIds(submission_id): PathIds<i64>,
) -> Result<Response, ApiError> {
    let submission = SubmissionRepo::new(&state.pool).get(submission_id).await?;

    let allowed = match me.user.role {
        Role::Admin => true,
        Role::Student => submission.student_id == me.user.id,
        Role::Instructor => {
            let assignment = AssignmentRepo::new(&state.pool).get(submission.assignment_id).await?;
            CourseRepo::new(&state.pool)
                .is_instructor(assignment.course_id, me.user.id)
                .await?
        }
    };
    if !allowed {
        return Err(ApiError::forbidden("You cannot download this file."));
    }

    match (&submission.stored_name, &submission.file_name) {
        (Some(stored), Some(name)) => send_file(&state, stored, name).await,
        _ => Err(ApiError::NotFound {
            resource: "attachment",
            id: submission_id.to_string(),
        }),
    }
}

/// Download routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/files/materials/{id}", get(material_file))
        .route("/files/submissions/{id}", get(submission_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_ascii_and_encodes_utf8() {
        let value = content_disposition("notes v2.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"notes v2.pdf\"; filename*=UTF-8''notes%20v2.pdf"
        );

        let value = content_disposition("résumé.txt");
        assert!(value.contains("filename=\"r_sum_.txt\""));
        assert!(value.contains("r%C3%A9sum%C3%A9.txt"));
    }
}

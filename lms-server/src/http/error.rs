//! HTTP error type with IntoResponse
//!
//! Errors render as HTML pages with matching status codes. An
//! unauthenticated request is not an error page but a redirect to the
//! login form.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use lms_core::ValidationError;

use crate::db::DbError;
use crate::session::Flash;
use crate::uploads::UploadError;
use crate::views;

/// Where unauthenticated visitors are sent
pub const LOGIN_REQUIRED: &str = "/login?required=1";

#[derive(Debug)]
pub enum ApiError {
    /// Form input rejected (400)
    Validation(ValidationError),

    /// Malformed request body (400)
    BadRequest { message: String },

    /// No valid session (303 to the login page)
    Unauthenticated,

    /// Wrong role or not a member of the course (403)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// State does not allow the change (409)
    Conflict { reason: String },

    /// Upload over the configured limit (413)
    PayloadTooLarge { max: usize },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Turn errors the user can fix into a flash message. Anything else
    /// is passed back to become an error page.
    pub fn into_flash(self) -> Result<Flash, ApiError> {
        match self {
            Self::Validation(e) => Ok(Flash::error(e.to_string())),
            Self::BadRequest { message } => Ok(Flash::error(message)),
            Self::Conflict { reason } => Ok(Flash::error(reason)),
            Self::PayloadTooLarge { max } => Ok(Flash::error(format!(
                "The file is too large (limit {} KiB).",
                max / 1024
            ))),
            other => Err(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, heading, message) = match &self {
            Self::Unauthenticated => return Redirect::to(LOGIN_REQUIRED).into_response(),
            Self::Validation(e) => (StatusCode::BAD_REQUEST, "Bad Request", e.to_string()),
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, "Bad Request", message.clone()),
            Self::Forbidden { reason } => (StatusCode::FORBIDDEN, "Forbidden", reason.clone()),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("{} '{}' not found", resource, id),
            ),
            Self::Conflict { reason } => (StatusCode::CONFLICT, "Conflict", reason.clone()),
            Self::PayloadTooLarge { max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large",
                format!("uploads are limited to {} bytes", max),
            ),
            Self::Database(e) => {
                // Log the actual error, show a generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "an internal error occurred".to_string(),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "an internal error occurred".to_string(),
                )
            }
        };

        let page = views::error::error_page(status.as_u16(), heading, &message);
        (status, Html(page)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { reason } => Self::Conflict { reason },
            _ => Self::Database(e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Empty => Self::BadRequest {
                message: e.to_string(),
            },
            UploadError::TooLarge { max } => Self::PayloadTooLarge { max },
            UploadError::InvalidName => Self::NotFound {
                resource: "file",
                id: "invalid name".into(),
            },
            UploadError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => Self::NotFound {
                resource: "file",
                id: "missing on disk".into(),
            },
            UploadError::Io(err) => Self::Internal {
                message: format!("upload storage: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "title" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unauthenticated_redirects_to_login() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_REQUIRED);
    }

    #[tokio::test]
    async fn forbidden_is_403() {
        let response = ApiError::forbidden("students only").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn db_not_found_maps_to_404() {
        let err: ApiError = DbError::NotFound {
            resource: "course",
            id: "7".into(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn user_errors_become_flash() {
        let flash = ApiError::Conflict {
            reason: "already graded".into(),
        }
        .into_flash()
        .unwrap();
        assert_eq!(flash.message, "already graded");

        assert!(ApiError::Unauthenticated.into_flash().is_err());
        assert!(ApiError::Internal { message: "x".into() }.into_flash().is_err());
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        let err: ApiError = UploadError::TooLarge { max: 10 }.into();
        assert!(matches!(err, ApiError::PayloadTooLarge { max: 10 }));
    }
}

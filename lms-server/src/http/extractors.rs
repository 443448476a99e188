//! Custom Axum extractors

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header;
use axum::http::request::Parts;
use lms_core::Role;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use crate::db::{DbError, User, UserRepo};
use crate::session::token_from_cookie_header;
use crate::state::AppState;

/// Session attached to the request, if any. Never rejects.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCtx {
    pub token: Option<Uuid>,
    pub user_id: Option<i64>,
}

impl FromRequestParts<Arc<AppState>> for SessionCtx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<SessionCtx>() {
            return Ok(*ctx);
        }

        let token = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| token_from_cookie_header(value, &state.cookie_name));

        let ctx = match token {
            Some(token) => match state.sessions.touch(token).await {
                Some(info) => SessionCtx {
                    token: Some(info.token),
                    user_id: info.user_id,
                },
                None => SessionCtx::default(),
            },
            None => SessionCtx::default(),
        };

        parts.extensions.insert(ctx);
        Ok(ctx)
    }
}

/// Logged-in user. Rejects with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: Uuid,
}

impl CurrentUser {
    /// Keep the user only if they hold `role`.
    pub fn require(self, role: Role) -> Result<Self, ApiError> {
        if self.user.is(role) {
            Ok(self)
        } else {
            Err(ApiError::forbidden(format!(
                "This page is only available to the {} role.",
                role.label().to_lowercase()
            )))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let ctx = match SessionCtx::from_request_parts(parts, state).await {
            Ok(ctx) => ctx,
            Err(never) => match never {},
        };

        let (Some(token), Some(user_id)) = (ctx.token, ctx.user_id) else {
            return Err(ApiError::Unauthenticated);
        };

        match UserRepo::new(&state.pool).get(user_id).await {
            Ok(user) => Ok(Self { user, token }),
            Err(DbError::NotFound { .. }) => {
                // Account deleted while logged in
                state.sessions.destroy(token).await;
                Err(ApiError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Logged-in administrator
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self(current.require(Role::Admin)?))
    }
}

/// Logged-in instructor
pub struct InstructorUser(pub CurrentUser);

impl FromRequestParts<Arc<AppState>> for InstructorUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self(current.require(Role::Instructor)?))
    }
}

/// Logged-in student
pub struct StudentUser(pub CurrentUser);

impl FromRequestParts<Arc<AppState>> for StudentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self(current.require(Role::Student)?))
    }
}

/// Numeric path parameters. A non-numeric id is a missing page, not a
/// bad request.
pub struct PathIds<T>(pub T);

impl<S, T> FromRequestParts<S> for PathIds<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(ids)) => Ok(Self(ids)),
            Err(_) => Err(ApiError::NotFound {
                resource: "page",
                id: parts.uri.path().to_string(),
            }),
        }
    }
}

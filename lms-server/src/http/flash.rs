//! Post/redirect/get with one-shot messages

use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use super::error::ApiError;
use crate::session::{session_cookie, Flash};
use crate::state::AppState;

/// Redirect with a flash message attached to the session.
///
/// Visitors without a session get an anonymous one so the message
/// survives the redirect.
pub async fn redirect(state: &AppState, token: Option<Uuid>, to: &str, flash: Flash) -> Response {
    if let Some(token) = token {
        if state.sessions.push_flash(token, flash.clone()).await {
            return Redirect::to(to).into_response();
        }
    }

    let token = state.sessions.create_anonymous().await;
    state.sessions.push_flash(token, flash).await;
    (
        [(header::SET_COOKIE, session_cookie(&state.cookie_name, token))],
        Redirect::to(to),
    )
        .into_response()
}

/// Pending messages for the page about to be rendered.
pub async fn take(state: &AppState, token: Option<Uuid>) -> Vec<Flash> {
    match token {
        Some(token) => state.sessions.take_flash(token).await,
        None => Vec::new(),
    }
}

/// Success message, or a flash for errors the user can fix.
pub fn outcome<T>(result: Result<T, ApiError>, success: impl FnOnce(T) -> Flash) -> Result<Flash, ApiError> {
    result.map(success).or_else(ApiError::into_flash)
}

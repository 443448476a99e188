//! Welcome page, login and logout

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use lms_core::models::LoginForm;

use crate::db::{DbError, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::SessionCtx;
use crate::http::flash;
use crate::session::{clear_cookie, session_cookie, Flash};
use crate::state::AppState;
use crate::views::{self, Page};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub required: Option<String>,
}

/// GET /
async fn welcome(State(state): State<Arc<AppState>>, ctx: SessionCtx) -> Result<Html<String>, ApiError> {
    let user = match ctx.user_id {
        Some(id) => match UserRepo::new(&state.pool).get(id).await {
            Ok(user) => Some(user),
            Err(DbError::NotFound { .. }) => None,
            Err(e) => {
                tracing::warn!(user_id = id, error = %e, "welcome page: failed to load user");
                None
            }
        },
        None => None,
    };
    let flash = flash::take(&state, ctx.token).await;

    let page = Page {
        user: user.as_ref(),
        flash: &flash,
    };
    Ok(Html(views::auth::welcome(&page)))
}

/// GET /login
async fn login_page(
    State(state): State<Arc<AppState>>,
    ctx: SessionCtx,
    Query(query): Query<LoginQuery>,
) -> Response {
    if ctx.user_id.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let flash = flash::take(&state, ctx.token).await;
    let required = query.required.is_some();
    Html(views::auth::login(&Page::anonymous(&flash), "", required)).into_response()
}

/// POST /login
async fn login(
    State(state): State<Arc<AppState>>,
    ctx: SessionCtx,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            return Ok(flash::redirect(&state, ctx.token, "/login", Flash::error(e.to_string())).await);
        }
    };

    let user = UserRepo::new(&state.pool)
        .authenticate(&credentials.username, &credentials.password)
        .await?;

    let Some(user) = user else {
        tracing::info!(username = %credentials.username, "login failed");
        let flash = Flash::error("Invalid username or password.");
        return Ok(flash::redirect(&state, ctx.token, "/login", flash).await);
    };

    // Fresh token on login; the pre-login one is discarded
    if let Some(old) = ctx.token {
        state.sessions.destroy(old).await;
    }
    let token = state.sessions.create(user.id).await;
    state
        .sessions
        .push_flash(token, Flash::success(format!("Welcome back, {}.", user.display_name())))
        .await;

    tracing::info!(user_id = user.id, role = %user.role, "login");

    Ok((
        [(header::SET_COOKIE, session_cookie(&state.cookie_name, token))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// POST /logout
async fn logout(State(state): State<Arc<AppState>>, ctx: SessionCtx) -> Response {
    if let Some(token) = ctx.token {
        state.sessions.destroy(token).await;
    }
    if let Some(user_id) = ctx.user_id {
        tracing::info!(user_id, "logout");
    }

    (
        [(header::SET_COOKIE, clear_cookie(&state.cookie_name))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Authentication routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(welcome))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

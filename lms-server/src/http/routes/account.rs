//! Dashboard and own profile

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Response},
    routing::get,
    Form, Router,
};
use lms_core::models::ProfileForm;
use lms_core::Role;

use crate::db::{CourseRepo, SubmissionRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::flash;
use crate::session::Flash;
use crate::state::AppState;
use crate::views::{self, dashboard::Overview, Page};

const RECENT_GRADES: usize = 5;

/// GET /dashboard
async fn dashboard(State(state): State<Arc<AppState>>, me: CurrentUser) -> Result<Html<String>, ApiError> {
    let courses = CourseRepo::new(&state.pool);

    let overview = match me.user.role {
        Role::Admin => Overview::Admin {
            users: UserRepo::new(&state.pool).count().await?,
            courses: courses.list_all().await?,
        },
        Role::Instructor => Overview::Instructor {
            courses: courses.list_for_instructor(me.user.id).await?,
        },
        Role::Student => {
            let mut recent: Vec<_> = SubmissionRepo::new(&state.pool)
                .for_student(me.user.id)
                .await?
                .into_iter()
                .filter(|row| row.graded_at.is_some())
                .collect();
            recent.sort_by(|a, b| b.graded_at.cmp(&a.graded_at));
            recent.truncate(RECENT_GRADES);

            Overview::Student {
                courses: courses.list_for_student(me.user.id).await?,
                recent,
            }
        }
    };

    let flash = flash::take(&state, Some(me.token)).await;
    Ok(Html(views::dashboard::dashboard(&Page::new(&me.user, &flash), &overview)))
}

/// GET /profile
async fn profile_page(State(state): State<Arc<AppState>>, me: CurrentUser) -> Html<String> {
    let flash = flash::take(&state, Some(me.token)).await;
    Html(views::profile::profile(&Page::new(&me.user, &flash), &me.user))
}

/// POST /profile
async fn update_profile(
    State(state): State<Arc<AppState>>,
    me: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, ApiError> {
    let result = match form.validate() {
        Ok(update) => UserRepo::new(&state.pool)
            .update_profile(me.user.id, &update)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e.into()),
    };

    let flash = flash::outcome(result, |user| {
        tracing::info!(user_id = user.id, "profile updated");
        Flash::success("Profile saved.")
    })?;

    Ok(flash::redirect(&state, Some(me.token), "/profile", flash).await)
}

/// Dashboard and profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", get(profile_page).post(update_profile))
}

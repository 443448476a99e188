//! Axum server setup
//!
//! Builds the router, prepares storage and runs until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use lms_core::config::BootstrapSection;
use lms_core::models::NewUserForm;
use lms_core::{LmsConfig, Role, ValidationError};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::routes;
use crate::db::{self, DbError, User, UserRepo};
use crate::state::AppState;

/// Room for form fields and multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5003)
    pub bind_addr: SocketAddr,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Largest accepted request body
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&LmsConfig::default())
    }
}

impl ServerConfig {
    pub fn from_config(config: &LmsConfig) -> Self {
        Self {
            bind_addr: config.server.bind,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
            body_limit: config.uploads.max_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        }
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::account::router())
        .merge(routes::admin::router())
        .merge(routes::courses::router())
        .merge(routes::assignments::router())
        .merge(routes::files::router())
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(middleware)
        .with_state(state)
}

/// Create the first administrator when the database has no accounts.
///
/// Returns the created user, or `None` when accounts already exist or no
/// credentials are configured.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    bootstrap: Option<&BootstrapSection>,
) -> Result<Option<User>, ServerError> {
    let users = UserRepo::new(pool);
    if users.count().await? > 0 {
        return Ok(None);
    }

    let Some(bootstrap) = bootstrap else {
        tracing::warn!("no accounts exist; create an administrator with `lms user create --role admin`");
        return Ok(None);
    };

    let new_user = NewUserForm {
        username: bootstrap.admin_username.clone(),
        password: bootstrap.admin_password.clone(),
        role: Role::Admin.as_str().to_string(),
        name: None,
    }
    .validate()?;

    let admin = users.create(&new_user).await?;
    tracing::info!(username = %admin.username, "bootstrap administrator created");
    Ok(Some(admin))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = LmsConfig::load()?;
/// run_server(config).await?;
/// ```
pub async fn run_server(config: LmsConfig) -> Result<(), ServerError> {
    let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
    db::migrations::run(&pool).await?;
    tracing::info!(database = %config.database.url, "database ready");

    bootstrap_admin(&pool, config.bootstrap.as_ref()).await?;

    tokio::fs::create_dir_all(&config.uploads.dir).await?;
    tracing::info!(uploads = %config.uploads.dir.display(), "upload storage ready");

    let server_config = ServerConfig::from_config(&config);
    let state = Arc::new(AppState::new(pool, &config));

    let sweeper = tokio::spawn(sweep_sessions(Arc::clone(&state)));

    let app = build_router(state, &server_config);

    // Bind listener
    let listener = TcpListener::bind(server_config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", server_config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn sweep_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = state.sessions.purge_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "expired sessions purged");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid bootstrap credentials: {0}")]
    Bootstrap(#[from] ValidationError),
}

pub mod auth;
pub mod conversations;
mod convert;
pub mod error;
pub mod format;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod users;

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    routing::{get, post},
};
use tracing::error;

use murmur_db::Database;

use crate::error::ApiError;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Build the full HTTP surface. Everything except `/auth/*` requires a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/", get(pages::home))
        .route(
            "/conversations",
            get(conversations::index).post(conversations::create),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(messages::index).post(messages::create),
        )
        .route(
            "/conversations/{conversation_id}/messages/new",
            get(messages::new),
        )
        .route("/users", get(users::index))
        .route("/users/{id}/block", post(users::block))
        .route("/users/{id}/unblock", post(users::unblock))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::Internal)
}

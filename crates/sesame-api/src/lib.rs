pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod render;
pub mod session;

pub use error::{ApiError, AuthError};

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::error;

use sesame_db::Database;

use crate::oauth::IdentityProvider;
use crate::session::SessionKeys;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub sessions: SessionKeys,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Every page and fragment route, gated. Static files, tracing and CORS are
/// layered on by the server binary.
pub fn router(state: AppState) -> Router {
    let guest_routes = Router::new()
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/register", get(auth::show_register).post(auth::register))
        .route("/auth/google", get(oauth::google_login))
        .route("/auth/google/callback", get(oauth::google_callback))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_guest,
        ));

    let protected_routes = Router::new()
        .route("/", get(chat::show_main_interface))
        .route("/dashboard", get(chat::show_main_interface))
        .route("/chat", post(chat::create_chat))
        .route("/chat/{id}", get(chat::get_chat_messages))
        .route("/chat/{id}/message", post(chat::send_message))
        .route("/logout", post(auth::logout))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(guest_routes)
        .merge(protected_routes)
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run blocking store work (SQLite, Argon2) off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> sesame_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{ApiError, AppState, with_db};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

/// Gate for signed-in routes. Anything without a valid session for a user
/// that still exists is sent to the login page; otherwise the handler gets a
/// [`CurrentUser`](sesame_types::session::CurrentUser) extension.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(user) = state.sessions.read(&jar).current_user() else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let user_id = user.id;
    match with_db(&state, move |db| db.get_user_by_id(user_id)).await {
        Ok(_) => {}
        Err(ApiError::NotFound) => {
            warn!("Session refers to unknown user {}", user_id);
            return (state.sessions.clear(jar), Redirect::to(LOGIN_PATH)).into_response();
        }
        Err(e) => return e.into_response(),
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Gate for login/registration routes: signed-in users go straight home.
pub async fn require_guest(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    if state.sessions.read(&jar).is_authenticated() {
        return Redirect::to(HOME_PATH).into_response();
    }
    next.run(req).await
}

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use sesame_db::{StoreError, password};
use sesame_types::api::{LoginForm, RegisterForm};
use sesame_types::models::User;
use sesame_types::session::Session;

use crate::middleware::{HOME_PATH, LOGIN_PATH};
use crate::{ApiError, AppState, AuthError, render, with_db};

/// htmx follows this header with a full-page navigation.
const HX_REDIRECT: &str = "HX-Redirect";

pub async fn show_login() -> Html<String> {
    Html(render::login_page())
}

pub async fn show_register() -> Html<String> {
    Html(render::register_page())
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    if form.username.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty()
    {
        return Ok(Html(render::auth_error("All fields are required")).into_response());
    }

    let created = with_db(&state, move |db| {
        db.create_local_user(&form.username, &form.email, &form.password)
    })
    .await;

    let user = match created {
        Ok(user) => user,
        Err(e) => {
            // Same message whatever collided.
            warn!("Registration rejected: {}", e);
            return Ok(Html(render::auth_error(
                "Registration failed. An account with these details may already exist",
            ))
            .into_response());
        }
    };

    info!("User {} registered", user.id);
    sign_in(&state, jar, user, "Registration successful! Redirecting...")
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(Html(render::auth_error("Email and password are required")).into_response());
    }

    match authenticate(&state, form).await {
        Ok(user) => {
            info!("User {} logged in", user.id);
            sign_in(&state, jar, user, "Login successful! Redirecting...")
        }
        Err(ApiError::Auth(failure)) => {
            Ok(Html(render::auth_error(&failure.to_string())).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Unknown email and wrong password both come back as
/// [`AuthError::InvalidCredentials`], and both cost one Argon2 verification.
async fn authenticate(state: &AppState, form: LoginForm) -> Result<User, ApiError> {
    let verified = with_db(state, move |db| match db.get_user_by_email(&form.email) {
        Ok(user) => Ok(db.verify_password(&user, &form.password).then_some(user)),
        Err(StoreError::NotFound) => {
            password::verify_decoy(&form.password);
            Ok(None)
        }
        Err(e) => Err(e),
    })
    .await?;

    verified.ok_or_else(|| AuthError::InvalidCredentials.into())
}

fn sign_in(
    state: &AppState,
    jar: CookieJar,
    user: User,
    message: &str,
) -> Result<Response, ApiError> {
    let jar = state
        .sessions
        .write(jar, &Session::signed_in(user.id, user.username))?;

    Ok((
        jar,
        [(HX_REDIRECT, HOME_PATH)],
        Html(render::auth_success(message)),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        state.sessions.clear(jar),
        [(HX_REDIRECT, LOGIN_PATH)],
        StatusCode::OK,
    )
}

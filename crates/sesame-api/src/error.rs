use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use sesame_db::StoreError;

/// Failures of a sign-in attempt, password or Google.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid state parameter")]
    StateMismatch,

    #[error("Google sign-in was cancelled")]
    Denied(String),

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Failed to exchange token")]
    Exchange(String),

    #[error("Failed to get user info")]
    Profile(String),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::StateMismatch | Self::Denied(_) | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::Exchange(_) | Self::Profile(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Request-boundary error. Its `Display` is what the user sees, so store and
/// provider details never end up in it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Already exists")]
    Duplicate,

    #[error("Conversation not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => Self::Validation(msg),
            StoreError::Duplicate => Self::Duplicate,
            StoreError::NotFound => Self::NotFound,
            other => {
                error!("Store error: {}", other);
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Auth(auth) => {
                match auth {
                    AuthError::Denied(detail)
                    | AuthError::Exchange(detail)
                    | AuthError::Profile(detail) => warn!("{}: {}", auth, detail),
                    _ => warn!("{}", auth),
                }
                auth.status()
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// -- OAuth --

/// Query string Google appends when redirecting back to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
    /// Set instead of `code` when the user declined consent.
    pub error: Option<String>,
}

/// Profile returned by Google's `oauth2/v2/userinfo` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
}

// -- Chat --

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    #[serde(default)]
    pub content: String,
}

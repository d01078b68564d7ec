use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use sesame_db::StoreError;
use sesame_types::api::{GoogleUser, OAuthCallbackQuery};
use sesame_types::session::Session;

use crate::config::Config;
use crate::middleware::HOME_PATH;
use crate::{ApiError, AppState, AuthError, with_db};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// External identity provider using the authorization-code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page the browser is sent to, carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange the callback `code` for a token and fetch the profile.
    async fn fetch_profile(&self, code: &str) -> Result<GoogleUser, AuthError>;
}

pub struct GoogleProvider {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url(),
            auth_url: Url::parse(GOOGLE_AUTH_URL)?,
            http: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &GOOGLE_SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline");
        url.into()
    }

    async fn fetch_profile(&self, code: &str) -> Result<GoogleUser, AuthError> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AuthError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        self.http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AuthError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Profile(e.to_string()))
    }
}

/// 256 bits from the thread RNG, URL-safe.
fn random_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let oauth_state = random_state();
    let jar = state
        .sessions
        .write(jar, &Session::pending_oauth(oauth_state.clone()))?;

    let url = state.identity.authorize_url(&oauth_state);
    Ok((jar, Redirect::temporary(&url)))
}

pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.read(&jar);
    let expected = session.oauth_state.as_deref().ok_or(AuthError::StateMismatch)?;
    if query.state.as_deref() != Some(expected) {
        return Err(AuthError::StateMismatch.into());
    }

    if let Some(reason) = query.error {
        return Err(AuthError::Denied(reason).into());
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let profile = state.identity.fetch_profile(&code).await?;
    if profile.email.is_empty() {
        return Err(AuthError::Profile("profile has no email".into()).into());
    }

    let user = with_db(&state, move |db| match db.get_user_by_email(&profile.email) {
        Err(StoreError::NotFound) => {
            db.create_oauth_user(&profile.name, &profile.email, &profile.id)
        }
        found => found,
    })
    .await?;

    info!("User {} signed in with Google", user.id);
    let jar = state
        .sessions
        .write(jar, &Session::signed_in(user.id, user.username))?;

    Ok((jar, Redirect::to(HOME_PATH)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 8080,
            db_path: "unused.db".into(),
            static_dir: "static".into(),
            session_secret: "s".into(),
            base_url: "https://chat.example.com".into(),
            google_client_id: "client-123".into(),
            google_client_secret: "shh".into(),
        };
        GoogleProvider::new(&config).unwrap()
    }

    #[test]
    fn consent_url_carries_state_and_redirect() {
        let url = Url::parse(&provider().authorize_url("abc-DEF_123")).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["state"], "abc-DEF_123");
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["redirect_uri"], "https://chat.example.com/auth/google/callback");
        assert!(pairs["scope"].contains("userinfo.email"));
        assert!(!pairs.contains_key("client_secret"));
    }

    #[test]
    fn states_are_random_and_url_safe() {
        let a = random_state();
        let b = random_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}

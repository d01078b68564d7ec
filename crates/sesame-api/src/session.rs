//! Session cookie codec.
//!
//! The whole [`Session`] record travels in one HttpOnly cookie as an HS256
//! JWT signed with the configured secret. Nothing is kept server side, so a
//! cookie that fails to decode is simply an empty session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use sesame_types::session::Session;

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "sesame_session";

const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    session: Session,
    exp: usize,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            secure,
        }
    }

    /// Missing, tampered and expired cookies all read as the empty session.
    pub fn read(&self, jar: &CookieJar) -> Session {
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Session::default();
        };

        match decode::<SessionClaims>(
            cookie.value(),
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(data) => data.claims.session,
            Err(e) => {
                debug!("Ignoring unusable session cookie: {}", e);
                Session::default()
            }
        }
    }

    /// Replace the session stored in the cookie.
    pub fn write(&self, jar: CookieJar, session: &Session) -> Result<CookieJar, ApiError> {
        let claims = SessionClaims {
            session: session.clone(),
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp()
                as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!("Failed to sign session: {}", e);
            ApiError::Internal
        })?;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);

        Ok(jar.add(cookie))
    }

    /// Expire the cookie immediately.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

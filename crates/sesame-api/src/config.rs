use std::path::PathBuf;

use tracing::warn;

/// Secret used when `SESAME_SESSION_SECRET` is unset. Fine for local
/// development, never for a deployment.
pub const PLACEHOLDER_SESSION_SECRET: &str = "dev-session-secret-change-me";

/// Process configuration, built once at startup and handed to whatever needs
/// it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub session_secret: String,
    /// Public origin of this server, used to build the OAuth redirect URL.
    pub base_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let session_secret = std::env::var("SESAME_SESSION_SECRET")
            .unwrap_or_else(|_| PLACEHOLDER_SESSION_SECRET.into());
        if session_secret == PLACEHOLDER_SESSION_SECRET {
            warn!("SESAME_SESSION_SECRET is unset; sessions are signed with the development placeholder");
        }

        let google_client_id = std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        if google_client_id.is_empty() {
            warn!("GOOGLE_CLIENT_ID is unset; Google sign-in will fail");
        }

        Ok(Self {
            host: std::env::var("SESAME_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("SESAME_PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            db_path: std::env::var("SESAME_DB_PATH")
                .unwrap_or_else(|_| "sesame.db".into())
                .into(),
            static_dir: std::env::var("SESAME_STATIC_DIR")
                .unwrap_or_else(|_| "static".into())
                .into(),
            session_secret,
            base_url: std::env::var("SESAME_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            google_client_id,
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
        })
    }

    pub fn google_redirect_url(&self) -> String {
        format!("{}/auth/google/callback", self.base_url)
    }

    /// Cookies get the `Secure` attribute when served over https.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

use rusqlite::params;
use tracing::debug;

use sesame_types::models::User;

use crate::models::{USER_COLUMNS, user_from_row};
use crate::{Database, Result, StoreError, password};

impl Database {
    /// Register a password account. Email is the unique login key.
    pub fn create_local_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let (username, email) = (username.trim(), email.trim());
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(StoreError::Validation("All fields are required"));
        }

        let password_hash = password::hash_password(password)?;

        let user = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)
                     RETURNING {USER_COLUMNS}"
                ),
                params![username, email, password_hash],
                user_from_row,
            )
            .map_err(StoreError::from)
        })?;

        debug!("Created local user {}", user.id);
        Ok(user)
    }

    /// Register an account that signs in through Google only. The stored
    /// password hash is empty.
    pub fn create_oauth_user(&self, name: &str, email: &str, external_id: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || external_id.is_empty() {
            return Err(StoreError::Validation("Email and provider ID are required"));
        }
        // Google may omit the display name; fall back to the address.
        let name = match name.trim() {
            "" => email,
            name => name,
        };

        let user = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO users (username, email, password_hash, google_id) VALUES (?1, ?2, '', ?3)
                     RETURNING {USER_COLUMNS}"
                ),
                params![name, email, external_id],
                user_from_row,
            )
            .map_err(StoreError::from)
        })?;

        debug!("Created OAuth user {}", user.id);
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email.trim()],
                user_from_row,
            )
            .map_err(StoreError::from)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .map_err(StoreError::from)
        })
    }

    pub fn verify_password(&self, user: &User, plaintext: &str) -> bool {
        password::verify_password(&user.password_hash, plaintext)
    }
}

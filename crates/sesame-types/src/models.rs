use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to every freshly created conversation.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Empty for accounts that were created through Google sign-in.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account can sign in with a password at all.
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// A flat, chronologically ordered list of messages owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub ai_id: Option<i64>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub content: String,
    /// `true` for assistant replies, `false` for what the user typed.
    pub is_incoming: bool,
    pub created_at: DateTime<Utc>,
}

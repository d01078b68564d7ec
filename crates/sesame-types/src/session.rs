use serde::{Deserialize, Serialize};

/// Everything a signed session cookie may carry.
///
/// The same record is used across the whole request lifecycle: a guest
/// carries at most `oauth_state` (only while a Google round trip is pending),
/// a signed-in user carries both `user_id` and `username`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_state: Option<String>,
}

/// The signed-in identity resolved from a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl Session {
    pub fn signed_in(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()),
            oauth_state: None,
        }
    }

    pub fn pending_oauth(state: impl Into<String>) -> Self {
        Self {
            oauth_state: Some(state.into()),
            ..Self::default()
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        match (self.user_id, &self.username) {
            (Some(id), Some(username)) => Some(CurrentUser {
                id,
                username: username.clone(),
            }),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_needs_both_id_and_name() {
        assert!(!Session::default().is_authenticated());
        assert!(!Session::pending_oauth("abc").is_authenticated());

        let partial = Session {
            user_id: Some(1),
            ..Session::default()
        };
        assert!(!partial.is_authenticated());

        let session = Session::signed_in(1, "ada");
        assert_eq!(
            session.current_user(),
            Some(CurrentUser {
                id: 1,
                username: "ada".into()
            })
        );
    }
}

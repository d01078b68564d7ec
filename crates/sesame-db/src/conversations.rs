use rusqlite::params;
use tracing::{debug, warn};

use sesame_types::models::{Conversation, DEFAULT_CONVERSATION_TITLE, Message};

use crate::models::{
    CONVERSATION_COLUMNS, MESSAGE_COLUMNS, NOW_SQL, conversation_from_row, message_from_row,
};
use crate::{Database, Result, StoreError};

/// Stand-in for a real generation step.
pub fn placeholder_reply(content: &str) -> String {
    format!("I received your message: \"{content}\". AI integration coming soon!")
}

impl Database {
    /// Most recently active first.
    pub fn list_conversations(&self, user_id: i64) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE user_id = ?1
                 ORDER BY updated_at DESC, id DESC"
            ))?;

            let rows = stmt
                .query_map([user_id], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn create_conversation(&self, user_id: i64) -> Result<Conversation> {
        let conversation = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO conversations (user_id, title) VALUES (?1, ?2)
                     RETURNING {CONVERSATION_COLUMNS}"
                ),
                params![user_id, DEFAULT_CONVERSATION_TITLE],
                conversation_from_row,
            )
            .map_err(StoreError::from)
        })?;

        debug!("User {} created conversation {}", user_id, conversation.id);
        Ok(conversation)
    }

    /// Returns `NotFound` both for unknown ids and for conversations owned by
    /// another user. Every message read or write must pass through here first.
    pub fn get_conversation(&self, conversation_id: i64, user_id: i64) -> Result<Conversation> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE id = ?1 AND user_id = ?2"
                ),
                params![conversation_id, user_id],
                conversation_from_row,
            )
            .map_err(StoreError::from)
        })
    }

    /// Oldest first. Does not check ownership.
    pub fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;

            let rows = stmt
                .query_map([conversation_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Insert one message and then bump the conversation's `updated_at`.
    /// The bump is a separate statement; if it fails the message is kept and
    /// the failure is only logged.
    pub fn append_message(
        &self,
        conversation_id: i64,
        content: &str,
        is_incoming: bool,
    ) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(StoreError::Validation("Message content is required"));
        }

        let message = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO messages (conversation_id, content, is_incoming) VALUES (?1, ?2, ?3)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                params![conversation_id, content, is_incoming],
                message_from_row,
            )
            .map_err(StoreError::from)
        })?;

        if let Err(e) = self.touch_conversation(conversation_id) {
            warn!("Failed to bump updated_at on conversation {}: {}", conversation_id, e);
        }

        Ok(message)
    }

    /// One user turn: the user's message, then the placeholder reply. The two
    /// writes are independent so a failed reply never loses the user message.
    pub fn record_turn(&self, conversation_id: i64, content: &str) -> Result<(Message, Message)> {
        let sent = self.append_message(conversation_id, content, false)?;
        let reply = self.append_message(conversation_id, &placeholder_reply(content), true)?;
        Ok((sent, reply))
    }

    fn touch_conversation(&self, conversation_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!("UPDATE conversations SET updated_at = {NOW_SQL} WHERE id = ?1"),
                [conversation_id],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let a = db.create_oauth_user("a", "a@example.com", "ga").unwrap().id;
        let b = db.create_oauth_user("b", "b@example.com", "gb").unwrap().id;
        (db, a, b)
    }

    #[test]
    fn new_conversation_has_default_title_and_no_messages() {
        let (db, a, _) = db_with_users();
        let conversation = db.create_conversation(a).unwrap();
        assert_eq!(conversation.user_id, a);
        assert_eq!(conversation.title, DEFAULT_CONVERSATION_TITLE);
        assert!(conversation.ai_id.is_none());
        assert!(db.list_messages(conversation.id).unwrap().is_empty());
    }

    #[test]
    fn other_users_conversations_are_not_found() {
        let (db, a, b) = db_with_users();
        let owned_by_b = db.create_conversation(b).unwrap();

        let err = db.get_conversation(owned_by_b.id, a).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let err = db.get_conversation(owned_by_b.id + 100, a).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        assert_eq!(db.get_conversation(owned_by_b.id, b).unwrap().id, owned_by_b.id);
        assert!(db.list_conversations(a).unwrap().is_empty());
    }

    #[test]
    fn turns_alternate_user_then_reply() {
        let (db, a, _) = db_with_users();
        let conversation = db.create_conversation(a).unwrap();

        let turns = ["hello", "how are you", "bye"];
        for text in turns {
            let (sent, reply) = db.record_turn(conversation.id, text).unwrap();
            assert!(!sent.is_incoming);
            assert!(reply.is_incoming);
            assert_eq!(reply.content, placeholder_reply(text));
        }

        let messages = db.list_messages(conversation.id).unwrap();
        assert_eq!(messages.len(), turns.len() * 2);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.is_incoming, i % 2 == 1);
        }
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[2].content, "how are you");
        assert!(messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn empty_content_is_rejected() {
        let (db, a, _) = db_with_users();
        let conversation = db.create_conversation(a).unwrap();

        assert!(matches!(
            db.append_message(conversation.id, "", false).unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(matches!(
            db.record_turn(conversation.id, "   ").unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(db.list_messages(conversation.id).unwrap().is_empty());
    }

    #[test]
    fn appending_moves_conversation_to_front() {
        let (db, a, _) = db_with_users();
        let older = db.create_conversation(a).unwrap();
        let newer = db.create_conversation(a).unwrap();

        let ids: Vec<i64> = db.list_conversations(a).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        // Step past the millisecond clock so the bump is strictly newer.
        std::thread::sleep(std::time::Duration::from_millis(5));
        db.append_message(older.id, "ping", false).unwrap();

        let listed = db.list_conversations(a).unwrap();
        assert_eq!(listed[0].id, older.id);
        assert!(listed[0].updated_at > older.updated_at);
    }

    #[test]
    fn failed_reply_keeps_user_message_and_failed_bump_is_ignored() {
        let (db, a, _) = db_with_users();
        let conversation = db.create_conversation(a).unwrap();

        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_replies BEFORE INSERT ON messages
                 WHEN NEW.is_incoming = 1
                 BEGIN SELECT RAISE(ABORT, 'reply rejected'); END;
                 CREATE TRIGGER reject_bumps BEFORE UPDATE ON conversations
                 BEGIN SELECT RAISE(ABORT, 'bump rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.record_turn(conversation.id, "hi").is_err());
        let messages = db.list_messages(conversation.id).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].is_incoming);
        assert_eq!(messages[0].content, "hi");

        let sent = db.append_message(conversation.id, "again", false).unwrap();
        assert_eq!(sent.content, "again");
        assert_eq!(db.list_messages(conversation.id).unwrap().len(), 2);

        let unchanged = db.get_conversation(conversation.id, a).unwrap();
        assert_eq!(unchanged.updated_at, conversation.updated_at);
    }

    #[test]
    fn messages_require_existing_conversation() {
        let db = Database::open_in_memory().unwrap();
        let err = db.append_message(42, "orphan", false).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}

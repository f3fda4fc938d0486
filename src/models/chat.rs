//! Chat message model
//!
//! Persisted transcript of the conversation with the assistant backend.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Who produced a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

impl ChatMessage {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_str: String = row.get("role")?;
        Ok(Self {
            id: row.get("id")?,
            role: ChatRole::parse(&role_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unexpected role value '{}'", role_str).into(),
                )
            })?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Append a message to the transcript
    pub fn append(conn: &Connection, role: ChatRole, content: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO chat_messages (role, content) VALUES (?1, ?2)",
            params![role.as_str(), content],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM chat_messages WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Most recent messages, returned in chronological order
    pub fn list_recent(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM (
                 SELECT * FROM chat_messages ORDER BY id DESC LIMIT ?1
             ) ORDER BY id ASC",
        )?;

        let messages = stmt
            .query_map([limit], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(messages)
    }

    /// Delete the whole transcript, returning the number of removed messages
    pub fn clear(conn: &Connection) -> DbResult<usize> {
        let deleted = conn.execute("DELETE FROM chat_messages", [])?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_append_and_list_in_order() {
        let conn = test_conn();
        ChatMessage::append(&conn, ChatRole::User, "what can I eat for lunch?").unwrap();
        ChatMessage::append(&conn, ChatRole::Assistant, "Here are three options...").unwrap();

        let messages = ChatMessage::list_recent(&conn, 10).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_list_recent_keeps_newest_chronological() {
        let conn = test_conn();
        for i in 0..5 {
            ChatMessage::append(&conn, ChatRole::User, &format!("message {}", i)).unwrap();
        }

        let messages = ChatMessage::list_recent(&conn, 2).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "message 3");
        assert_eq!(messages[1].content, "message 4");
    }

    #[test]
    fn test_clear() {
        let conn = test_conn();
        ChatMessage::append(&conn, ChatRole::User, "hello").unwrap();
        ChatMessage::append(&conn, ChatRole::Assistant, "hi").unwrap();

        assert_eq!(ChatMessage::clear(&conn).unwrap(), 2);
        assert!(ChatMessage::list_recent(&conn, 10).unwrap().is_empty());
    }
}

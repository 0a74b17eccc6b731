//! Read cursors and the `check` protocol
//!
//! Each session keeps the id of the last message it consumed. A check
//! delivers everything above the cursor that someone else sent, then moves
//! the cursor to the highest delivered id. Nothing is replayed.

use tracing::debug;

use crate::bus::{Message, MessageLog};
use crate::registry::NameRegistry;
use crate::store::CommsDb;

/// An unread message, tagged when its body addresses the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadMessage {
    pub message: Message,
    pub directed: bool,
}

/// Outcome of one `check` call.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Name the session resolved to (the sender filtered out)
    pub name: String,
    pub unread: Vec<UnreadMessage>,
}

impl CheckReport {
    pub fn is_empty(&self) -> bool {
        self.unread.is_empty()
    }
}

/// Whether `body` is addressed to `name` (`"Web: ..."` or `"web, ..."`).
pub fn is_directed(body: &str, name: &str) -> bool {
    let body = body.to_lowercase();
    let name = name.to_lowercase();
    body.starts_with(&format!("{}:", name)) || body.starts_with(&format!("{},", name))
}

/// Per-session read cursors over the shared store.
pub struct ReadCursors<'a> {
    db: &'a CommsDb,
}

impl<'a> ReadCursors<'a> {
    pub fn new(db: &'a CommsDb) -> Self {
        Self { db }
    }

    /// Last consumed message id; 0 for a session that never checked.
    pub async fn get(&self, session_id: &str) -> crate::Result<i64> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT message_id FROM last_read WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids.into_iter().next().unwrap_or(0))
    }

    /// Overwrite the cursor. Monotonicity is the caller's business.
    pub async fn set(&self, session_id: &str, message_id: i64) -> crate::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO last_read (session_id, message_id) VALUES (?, ?)
            ON CONFLICT(session_id) DO UPDATE SET message_id = excluded.message_id
            "#,
        )
        .bind(session_id)
        .bind(message_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Deliver unread messages from other senders and advance the cursor.
    ///
    /// When nothing is new the cursor is left as it was.
    pub async fn check(&self, session_id: &str) -> crate::Result<CheckReport> {
        let name = NameRegistry::new(self.db).resolve(session_id).await?;
        let last_id = self.get(session_id).await?;

        let messages = MessageLog::new(self.db)
            .query_since(last_id, Some(&name))
            .await?;

        if let Some(newest) = messages.last() {
            self.set(session_id, newest.id).await?;
            debug!(session_id, from = last_id, to = newest.id, "Advanced read cursor");
        }

        let unread = messages
            .into_iter()
            .map(|message| {
                let directed = is_directed(&message.body, &name);
                UnreadMessage { message, directed }
            })
            .collect();

        Ok(CheckReport { name, unread })
    }
}

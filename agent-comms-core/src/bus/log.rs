//! Repository for the append-only message log.

use chrono::NaiveDateTime;
use tracing::debug;

use super::message::{Message, DEFAULT_CHANNEL, TIMESTAMP_FORMAT};
use crate::status::SenderActivity;
use crate::store::CommsDb;

// Single-row reads go through `fetch_all` so the statement steps to
// completion; a half-stepped statement keeps its WAL snapshot open and
// later reads on the same connection miss other processes' commits.

// Rows written by older tools may carry NULL channel/timestamp.
const MESSAGE_COLUMNS: &str = "id, COALESCE(timestamp, '') AS timestamp, sender, \
     COALESCE(channel, 'general') AS channel, message";

/// Message log operations over the shared store.
pub struct MessageLog<'a> {
    db: &'a CommsDb,
}

impl<'a> MessageLog<'a> {
    pub fn new(db: &'a CommsDb) -> Self {
        Self { db }
    }

    /// Append a message and return its id.
    ///
    /// The store assigns both the id and the local timestamp. An empty
    /// channel falls back to [`DEFAULT_CHANNEL`].
    pub async fn post(&self, sender: &str, channel: &str, body: &str) -> crate::Result<i64> {
        if body.trim().is_empty() {
            return Err(crate::Error::Validation(
                "message body must not be empty".to_string(),
            ));
        }
        if sender.trim().is_empty() {
            return Err(crate::Error::Validation(
                "sender must not be empty".to_string(),
            ));
        }
        let channel = if channel.trim().is_empty() {
            DEFAULT_CHANNEL
        } else {
            channel
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO messages (sender, channel, message)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(sender)
        .bind(channel)
        .bind(body)
        .fetch_all(self.db.pool())
        .await?
        .into_iter()
        .next()
        .ok_or(sqlx::Error::RowNotFound)?;

        debug!(id, sender, channel, "Posted message");
        Ok(id)
    }

    /// All messages with id > `min_id`, ascending, optionally skipping one sender.
    pub async fn query_since(
        &self,
        min_id: i64,
        exclude_sender: Option<&str>,
    ) -> crate::Result<Vec<Message>> {
        let sql = format!(
            "SELECT {} FROM messages WHERE id > ?1 AND (?2 IS NULL OR sender != ?2) ORDER BY id",
            MESSAGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, Message>(&sql)
            .bind(min_id)
            .bind(exclude_sender)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    /// Highest message id, or 0 when the log is empty.
    pub async fn latest_id(&self) -> crate::Result<i64> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM messages")
            .fetch_all(self.db.pool())
            .await?;
        Ok(ids.into_iter().next().unwrap_or(0))
    }

    /// The most recent `n` messages, returned oldest-first.
    pub async fn recent(&self, n: u32) -> crate::Result<Vec<Message>> {
        let sql = format!(
            "SELECT {} FROM messages ORDER BY id DESC LIMIT ?",
            MESSAGE_COLUMNS
        );
        let mut rows = sqlx::query_as::<_, Message>(&sql)
            .bind(i64::from(n))
            .fetch_all(self.db.pool())
            .await?;
        rows.reverse();
        Ok(rows)
    }

    /// Distinct senders, most recently active first.
    pub async fn recent_senders(&self, limit: u32) -> crate::Result<Vec<String>> {
        let senders = sqlx::query_scalar::<_, String>(
            r#"
            SELECT sender FROM messages
            GROUP BY sender
            ORDER BY MAX(id) DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;
        Ok(senders)
    }

    /// Per-sender activity for messages stamped at or after `cutoff`.
    ///
    /// Timestamps are compared as text; the stored format sorts
    /// lexicographically in time order.
    pub async fn activity_since(&self, cutoff: NaiveDateTime) -> crate::Result<Vec<SenderActivity>> {
        let cutoff = cutoff.format(TIMESTAMP_FORMAT).to_string();
        let rows = sqlx::query_as::<_, SenderActivity>(
            r#"
            SELECT sender,
                   COUNT(*) AS message_count,
                   MIN(timestamp) AS first_seen,
                   MAX(timestamp) AS last_seen
            FROM messages
            WHERE timestamp >= ?
            GROUP BY sender
            ORDER BY last_seen DESC
            "#,
        )
        .bind(cutoff)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}

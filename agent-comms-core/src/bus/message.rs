//! Message rows

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Channel used when a post does not name one
pub const DEFAULT_CHANNEL: &str = "general";

/// Format SQLite writes into `messages.timestamp` and `agents.created`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A message in the shared log. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Store-assigned, strictly increasing
    pub id: i64,
    /// Local time of insert, as stored. Descriptive only, never used for ordering.
    pub timestamp: String,
    pub sender: String,
    pub channel: String,
    #[sqlx(rename = "message")]
    pub body: String,
}

impl Message {
    /// Parse the stored timestamp; `None` when the text is malformed.
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse a stored local timestamp, with or without fractional seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

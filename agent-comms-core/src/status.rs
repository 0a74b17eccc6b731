//! Recent sender activity summary

use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::bus::message::parse_timestamp;
use crate::bus::MessageLog;
use crate::store::CommsDb;

/// Activity of one sender inside the status window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SenderActivity {
    pub sender: String,
    pub message_count: i64,
    pub first_seen: String,
    pub last_seen: String,
}

impl SenderActivity {
    pub fn last_seen_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.last_seen)
    }
}

/// Senders active within a trailing window, most recent first.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub window_minutes: u32,
    pub senders: Vec<SenderActivity>,
}

impl StatusReport {
    /// Build the report for the window ending now.
    pub async fn collect(db: &CommsDb, window_minutes: u32) -> crate::Result<Self> {
        Self::collect_at(db, window_minutes, Local::now().naive_local()).await
    }

    /// Build the report for the window ending at `now`.
    pub async fn collect_at(
        db: &CommsDb,
        window_minutes: u32,
        now: NaiveDateTime,
    ) -> crate::Result<Self> {
        let cutoff = now - Duration::minutes(i64::from(window_minutes));
        let senders = MessageLog::new(db).activity_since(cutoff).await?;
        Ok(Self {
            window_minutes,
            senders,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

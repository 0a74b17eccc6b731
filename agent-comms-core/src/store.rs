//! Shared SQLite store
//!
//! Every agent process opens the same database file. WAL journaling lets
//! readers proceed while a single writer commits; writers that find the
//! database locked wait up to the configured busy timeout and then fail.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::StoreConfig;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS agents (
        session_id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now', 'localtime'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS last_read (
        session_id TEXT PRIMARY KEY,
        message_id INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now', 'localtime')),
        sender TEXT NOT NULL,
        channel TEXT DEFAULT 'general',
        message TEXT NOT NULL
    )
    "#,
];

/// Handle to the shared comms database.
#[derive(Debug, Clone)]
pub struct CommsDb {
    pool: SqlitePool,
    path: PathBuf,
}

impl CommsDb {
    /// Open (and create if needed) the store described by `config`.
    pub async fn open(config: &StoreConfig) -> crate::Result<Self> {
        Self::open_with(
            &config.resolved_path(),
            config.busy_timeout(),
            config.connect_timeout(),
        )
        .await
    }

    /// Open a store at `path` with default timeouts.
    pub async fn open_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let defaults = StoreConfig::default();
        Self::open_with(
            path.as_ref(),
            defaults.busy_timeout(),
            defaults.connect_timeout(),
        )
        .await
    }

    async fn open_with(
        path: &Path,
        busy_timeout: Duration,
        connect_timeout: Duration,
    ) -> crate::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::Error::Store(format!(
                    "cannot create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        // One connection per process: concurrency is across processes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                crate::Error::Store(format!("cannot open store {}: {}", path.display(), e))
            })?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        debug!(path = %path.display(), "Opened comms store");
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the pool, flushing the connection cleanly.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

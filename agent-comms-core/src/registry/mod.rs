//! Name registry
//!
//! Maps opaque session ids to unique, human-readable agent names. Names are
//! scarce: assigning a held name to another session steals it. Resolution
//! never fails; unknown sessions get a synthesized `agent-xxxxxxxx` name.

pub mod heuristic;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::debug;

use crate::config::AgentNamesConfig;
use crate::store::CommsDb;
use crate::utils::char_prefix;

pub use heuristic::match_directory;

/// Prefix of synthesized names for unregistered sessions
pub const SYNTHETIC_PREFIX: &str = "agent-";

/// Number of session id characters kept in a synthesized name
const SYNTHETIC_ID_CHARS: usize = 8;

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub session_id: String,
    pub name: String,
    pub created: String,
}

/// How a sender in the log relates to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderAssignment {
    /// A synthesized `agent-` sender whose session now has this name
    Named(String),
    /// A synthesized `agent-` sender with no registered session
    Unassigned,
    /// Already a friendly (non-synthesized) sender
    Friendly,
}

/// Display name used for a session with no registry entry.
pub fn synthesized_name(session_id: &str) -> String {
    format!(
        "{}{}",
        SYNTHETIC_PREFIX,
        char_prefix(session_id, SYNTHETIC_ID_CHARS)
    )
}

/// Registry operations over the shared store.
pub struct NameRegistry<'a> {
    db: &'a CommsDb,
}

impl<'a> NameRegistry<'a> {
    pub fn new(db: &'a CommsDb) -> Self {
        Self { db }
    }

    /// Friendly name for a session.
    ///
    /// Exact id match first, then any registered id that is a prefix of
    /// `session_id` (longest wins), then a synthesized name.
    pub async fn resolve(&self, session_id: &str) -> crate::Result<String> {
        // fetch_all: see the note in bus/log.rs about half-stepped statements.
        let exact = sqlx::query_scalar::<_, String>("SELECT name FROM agents WHERE session_id = ?")
            .bind(session_id)
            .fetch_all(self.db.pool())
            .await?;
        if let Some(name) = exact.into_iter().next() {
            return Ok(name);
        }

        let by_prefix = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM agents
            WHERE length(session_id) > 0
              AND substr(?1, 1, length(session_id)) = session_id
            ORDER BY length(session_id) DESC
            LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(by_prefix
            .into_iter()
            .next()
            .unwrap_or_else(|| synthesized_name(session_id)))
    }

    /// Give `name` to `session_id`, removing it from any other holder.
    pub async fn assign(&self, name: &str, session_id: &str) -> crate::Result<()> {
        validate_assignment(name, session_id)?;

        let mut tx = self.db.pool().begin().await?;
        let stolen = sqlx::query("DELETE FROM agents WHERE name = ? AND session_id != ?")
            .bind(name)
            .bind(session_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(
            r#"
            INSERT INTO agents (session_id, name) VALUES (?, ?)
            ON CONFLICT(session_id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(session_id)
        .bind(name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if stolen > 0 {
            debug!(name, session_id, "Reassigned name from previous holder");
        }
        debug!(name, session_id, "Assigned name");
        Ok(())
    }

    /// Give `name` to the session identified by a possibly shortened id.
    ///
    /// `agent_id` may be a displayed sender (`agent-1234abcd`) or a session
    /// id prefix. The first registered session whose id starts with that
    /// prefix is renamed; if none exists the prefix itself is registered.
    /// Returns the session id that now holds `name`.
    pub async fn assign_prefix(&self, name: &str, agent_id: &str) -> crate::Result<String> {
        let prefix = agent_id.strip_prefix(SYNTHETIC_PREFIX).unwrap_or(agent_id);
        validate_assignment(name, prefix)?;

        let session_id = match self.find_by_prefix(prefix).await? {
            Some(agent) => agent.session_id,
            None => prefix.to_string(),
        };
        self.assign(name, &session_id).await?;
        Ok(session_id)
    }

    /// Apply the directory heuristic; the registry is untouched on no match.
    pub async fn auto_assign(
        &self,
        session_id: &str,
        cwd: &str,
        names: &AgentNamesConfig,
    ) -> crate::Result<Option<String>> {
        let Some(name) = match_directory(cwd, names) else {
            debug!(session_id, cwd, "No directory match for auto-assign");
            return Ok(None);
        };
        self.assign(&name, session_id).await?;
        Ok(Some(name))
    }

    /// A registered agent whose session id starts with `prefix`.
    pub async fn find_by_prefix(&self, prefix: &str) -> crate::Result<Option<Agent>> {
        if prefix.is_empty() {
            return Ok(None);
        }
        let agents = sqlx::query_as::<_, Agent>(
            r#"
            SELECT session_id, name, COALESCE(created, '') AS created FROM agents
            WHERE substr(session_id, 1, length(?1)) = ?1
            ORDER BY created DESC
            LIMIT 1
            "#,
        )
        .bind(prefix)
        .fetch_all(self.db.pool())
        .await?;
        Ok(agents.into_iter().next())
    }

    /// Classify a log sender for the `assign` listing.
    pub async fn sender_assignment(&self, sender: &str) -> crate::Result<SenderAssignment> {
        let Some(prefix) = sender.strip_prefix(SYNTHETIC_PREFIX) else {
            return Ok(SenderAssignment::Friendly);
        };
        Ok(match self.find_by_prefix(prefix).await? {
            Some(agent) => SenderAssignment::Named(agent.name),
            None => SenderAssignment::Unassigned,
        })
    }

    /// Every registered agent, newest first.
    pub async fn list(&self) -> crate::Result<Vec<Agent>> {
        let agents = sqlx::query_as::<_, Agent>(
            "SELECT session_id, name, COALESCE(created, '') AS created FROM agents ORDER BY created DESC, name",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(agents)
    }
}

fn validate_assignment(name: &str, session_id: &str) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(crate::Error::Validation("name must not be empty".to_string()));
    }
    if session_id.is_empty() {
        return Err(crate::Error::Validation(
            "session id must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, CommsDb) {
        let temp = TempDir::new().unwrap();
        let db = CommsDb::open_path(temp.path().join("messages.db"))
            .await
            .unwrap();
        (temp, db)
    }

    fn names(list: &[&str]) -> AgentNamesConfig {
        AgentNamesConfig {
            names: list.iter().map(ToString::to_string).collect(),
            dir_map: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_resolve_unregistered_falls_back() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        assert_eq!(
            registry.resolve("abcdef1234567890").await.unwrap(),
            "agent-abcdef12"
        );
        assert_eq!(registry.resolve("abc").await.unwrap(), "agent-abc");
    }

    #[tokio::test]
    async fn test_resolve_exact_and_stored_prefix() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Web", "abcdef12").await.unwrap();
        registry.assign("API", "abcdef1234567890").await.unwrap();

        // Exact match beats the shorter registered prefix.
        assert_eq!(registry.resolve("abcdef1234567890").await.unwrap(), "API");
        // Registered "abcdef12" is a prefix of the longer query.
        assert_eq!(registry.resolve("abcdef12ffff").await.unwrap(), "Web");
        // A query shorter than every registered id does not match.
        assert_eq!(registry.resolve("abcd").await.unwrap(), "agent-abcd");
    }

    #[tokio::test]
    async fn test_resolve_shared_prefix_is_ambiguous_but_named() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Web", "sess-1").await.unwrap();
        registry.assign("API", "sess-12").await.unwrap();

        // Both registered ids prefix the query; either name is acceptable.
        let name = registry.resolve("sess-123").await.unwrap();
        assert!(name == "Web" || name == "API");
    }

    #[tokio::test]
    async fn test_assign_steals_name() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Web", "s1").await.unwrap();
        registry.assign("Web", "s2").await.unwrap();

        assert_eq!(registry.resolve("s2").await.unwrap(), "Web");
        assert_ne!(registry.resolve("s1").await.unwrap(), "Web");
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_is_idempotent_and_renames() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Web", "s1").await.unwrap();
        registry.assign("Web", "s1").await.unwrap();
        assert_eq!(registry.list().await.unwrap().len(), 1);

        registry.assign("API", "s1").await.unwrap();
        assert_eq!(registry.resolve("s1").await.unwrap(), "API");
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_rejects_empty_input() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        assert!(matches!(
            registry.assign("", "s1").await.unwrap_err(),
            crate::Error::Validation(_)
        ));
        assert!(matches!(
            registry.assign_prefix("Web", "agent-").await.unwrap_err(),
            crate::Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_assign_prefix_renames_registered_session() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Data", "1234abcd-full-session").await.unwrap();
        let session = registry.assign_prefix("Web", "agent-1234abcd").await.unwrap();

        assert_eq!(session, "1234abcd-full-session");
        assert_eq!(
            registry.resolve("1234abcd-full-session").await.unwrap(),
            "Web"
        );
    }

    #[tokio::test]
    async fn test_assign_prefix_registers_unknown_prefix() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        let session = registry.assign_prefix("Web", "agent-9f8e7d6c").await.unwrap();
        assert_eq!(session, "9f8e7d6c");

        // The later, longer session id resolves through the stored prefix.
        assert_eq!(
            registry.resolve("9f8e7d6c-5b4a-3210").await.unwrap(),
            "Web"
        );
    }

    #[tokio::test]
    async fn test_auto_assign_matches_suffix() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);
        let config = names(&["Sysadmin", "Web", "API", "Data"]);

        let name = registry
            .auto_assign("sess-abc", "/work/taskflow-web", &config)
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("Web"));
        assert_eq!(registry.resolve("sess-abc").await.unwrap(), "Web");
    }

    #[tokio::test]
    async fn test_auto_assign_no_match_leaves_registry_unchanged() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);
        let config = names(&["Sysadmin", "Web", "API", "Data"]);

        registry.assign("API", "other").await.unwrap();
        let before = registry.list().await.unwrap();

        let name = registry
            .auto_assign("sess-abc", "/work/webapp", &config)
            .await
            .unwrap();
        assert!(name.is_none());
        assert_eq!(registry.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_sender_assignment() {
        let (_temp, db) = setup().await;
        let registry = NameRegistry::new(&db);

        registry.assign("Web", "1234abcd-xyz").await.unwrap();

        assert_eq!(
            registry.sender_assignment("agent-1234abcd").await.unwrap(),
            SenderAssignment::Named("Web".to_string())
        );
        assert_eq!(
            registry.sender_assignment("agent-ffff0000").await.unwrap(),
            SenderAssignment::Unassigned
        );
        assert_eq!(
            registry.sender_assignment("agent-").await.unwrap(),
            SenderAssignment::Unassigned
        );
        assert_eq!(
            registry.sender_assignment("nick").await.unwrap(),
            SenderAssignment::Friendly
        );
    }
}

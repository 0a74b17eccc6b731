//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::expand_tilde;

/// Root configuration for agent-comms
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Shared store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Friendly agent names and directory overrides
    #[serde(default)]
    pub agents: AgentNamesConfig,
    /// Live view polling intervals
    #[serde(default)]
    pub poll: PollConfig,
    /// Local identity used by `chat`
    #[serde(default)]
    pub chat: ChatConfig,
    /// Status summary settings
    #[serde(default)]
    pub status: StatusConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shared store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite database file (`~` is expanded)
    #[serde(default = "default_store_path")]
    pub path: String,
    /// How long a writer waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// How long opening a connection may take
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_store_path() -> String {
    "~/.claude/comms/messages.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    3000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        expand_tilde(&self.path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Friendly names that can be auto-assigned from working directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentNamesConfig {
    /// Candidate names, in priority order. `taskflow-web` matches `Web`.
    #[serde(default = "default_agent_names")]
    pub names: Vec<String>,
    /// Lowercase directory basename -> name overrides, e.g. `{"ops": "Sysadmin"}`
    #[serde(default)]
    pub dir_map: HashMap<String, String>,
}

fn default_agent_names() -> Vec<String> {
    ["Sysadmin", "Web", "API", "Data"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for AgentNamesConfig {
    fn default() -> Self {
        Self {
            names: default_agent_names(),
            dir_map: HashMap::new(),
        }
    }
}

/// Polling intervals for the live views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
    #[serde(default = "default_chat_interval_ms")]
    pub chat_interval_ms: u64,
}

fn default_watch_interval_ms() -> u64 {
    1500
}

fn default_chat_interval_ms() -> u64 {
    500
}

impl PollConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }

    pub fn chat_interval(&self) -> Duration {
        Duration::from_millis(self.chat_interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            watch_interval_ms: default_watch_interval_ms(),
            chat_interval_ms: default_chat_interval_ms(),
        }
    }
}

/// Identity used for messages typed into `chat` and the default `post` sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_sender")]
    pub sender: String,
    #[serde(default = "default_chat_channel")]
    pub channel: String,
    /// Number of past messages shown when chat starts
    #[serde(default = "default_chat_backlog")]
    pub backlog: u32,
}

fn default_chat_sender() -> String {
    "nick".to_string()
}

fn default_chat_channel() -> String {
    crate::bus::DEFAULT_CHANNEL.to_string()
}

fn default_chat_backlog() -> u32 {
    10
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            sender: default_chat_sender(),
            channel: default_chat_channel(),
            backlog: default_chat_backlog(),
        }
    }
}

/// Status summary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Senders with no message in this window are not listed
    #[serde(default = "default_status_window_minutes")]
    pub window_minutes: u32,
}

fn default_status_window_minutes() -> u32 {
    10
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_status_window_minutes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files (`~` is expanded)
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.claude/comms/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

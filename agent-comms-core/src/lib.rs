//! Core types for agent-comms
//!
//! A shared, persistent message bus for independent agent processes. Every
//! process opens the same SQLite store directly; the store's own locking is
//! the only synchronization between them.

pub mod bus;
pub mod config;
pub mod cursor;
pub mod error;
pub mod logging;
pub mod registry;
pub mod status;
pub mod store;
pub mod utils;

pub use bus::{Message, MessageLog, PollBatch, Poller};
pub use config::{Config, ConfigLoader};
pub use cursor::{CheckReport, ReadCursors, UnreadMessage};
pub use error::{Error, Result};
pub use registry::NameRegistry;
pub use status::{SenderActivity, StatusReport};
pub use store::CommsDb;

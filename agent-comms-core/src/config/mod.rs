//! Configuration management
//!
//! Handles loading and validation of agent-comms configuration from a config
//! file and environment variables. Loaded once per process.

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::ConfigLoader;
pub use schema::*;

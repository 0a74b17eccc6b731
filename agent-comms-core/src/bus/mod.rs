//! Durable message log
//!
//! The log is append-only and ordered by id. Consumers never receive pushes;
//! they re-query with a watermark (see [`Poller`]).

pub mod log;
pub mod message;
pub mod poll;

pub use log::MessageLog;
pub use message::{Message, DEFAULT_CHANNEL};
pub use poll::{PollBatch, Poller};

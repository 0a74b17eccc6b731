//! Text rendering for log rows, unread checks and status tables.

use agent_comms_core::bus::message::parse_timestamp;
use agent_comms_core::utils::char_prefix;
use agent_comms_core::{Message, SenderActivity, UnreadMessage};
use tracing::warn;

const UNKNOWN_CLOCK: &str = "??:??:??";

fn clock(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|t| t.format("%H:%M:%S").to_string())
}

/// `HH:MM:SS`, or the raw text's first 8 characters when it doesn't parse.
fn clock_or_raw(raw: &str) -> String {
    clock(raw).unwrap_or_else(|| {
        warn!(timestamp = raw, "Unparseable message timestamp");
        if raw.is_empty() {
            UNKNOWN_CLOCK.to_string()
        } else {
            char_prefix(raw, 8).to_string()
        }
    })
}

/// One log line: `HH:MM:SS sender #channel body`, columns padded.
pub fn format_row(message: &Message) -> String {
    format!(
        "{} {:<18} #{:<10} {}",
        clock_or_raw(&message.timestamp),
        message.sender,
        message.channel,
        message.body
    )
}

pub fn check_header(name: &str) -> String {
    format!("[comms] New messages (you are {}):", name)
}

/// One unread line of `check`, tagged when addressed to the reader.
pub fn format_unread(unread: &UnreadMessage) -> String {
    let message = &unread.message;
    let time = clock(&message.timestamp).unwrap_or_else(|| {
        warn!(timestamp = %message.timestamp, "Unparseable message timestamp");
        UNKNOWN_CLOCK.to_string()
    });
    let tag = if unread.directed { " >>> FOR YOU" } else { "" };
    format!("  {} {}: {}{}", time, message.sender, message.body, tag)
}

pub fn status_header() -> String {
    format!("{:<20} {:>5}  {:<12}", "Sender", "Msgs", "Last seen")
}

pub fn format_status_row(activity: &SenderActivity) -> String {
    let last_seen = clock(&activity.last_seen).unwrap_or_else(|| {
        if activity.last_seen.is_empty() {
            "?".to_string()
        } else {
            char_prefix(&activity.last_seen, 8).to_string()
        }
    });
    format!(
        "{:<20} {:>5}  {:<12}",
        activity.sender, activity.message_count, last_seen
    )
}

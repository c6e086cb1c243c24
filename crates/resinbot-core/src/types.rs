//! Message types exchanged with chat channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a message came from within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadType {
    /// One-on-one conversation with the bot.
    Direct,
    /// Group chat — replies and reminders should address the sender by name.
    Group,
}

/// A message received from a chat channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub channel: String,
    /// Chat/conversation the message arrived in.
    pub thread_id: String,
    /// Stable identity of the sender — used as the record store key.
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub content: String,
    pub thread_type: ThreadType,
    pub timestamp: DateTime<Utc>,
}

/// A message to deliver through a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel: String,
    pub thread_id: String,
    pub content: String,
}

impl OutgoingMessage {
    pub fn text(channel: &str, thread_id: &str, content: impl Into<String>) -> Self {
        Self {
            channel: channel.to_string(),
            thread_id: thread_id.to_string(),
            content: content.into(),
        }
    }
}

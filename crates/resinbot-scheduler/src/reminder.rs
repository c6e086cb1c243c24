//! Reminder payloads.
//!
//! Everything a fired callback needs travels in the payload — nothing is
//! captured from session state, so a reminder can be rebuilt from a stored
//! record after a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use resinbot_core::error::Result;
use resinbot_core::regen::{self, RESIN_CAP, ResinRecord};

/// Which event a reminder announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// The projected count reached the configured threshold.
    ThresholdReached,
    /// The count has been sitting past the cap for the grace period.
    CapOverflow,
}

/// A scheduled notification for one user.
#[derive(Debug, Clone)]
pub struct Reminder {
    /// Record store key of the user being reminded.
    pub user_key: String,
    /// Chat to deliver into.
    pub thread_id: String,
    /// Name to address in group chats.
    pub mention: Option<String>,
    pub kind: ReminderKind,
    /// The count the reminder announces (the threshold or the cap).
    pub target: u32,
    pub fire_at: DateTime<Utc>,
}

impl Reminder {
    /// Threshold reminder for a freshly accepted record.
    pub fn threshold(
        user_key: &str,
        thread_id: &str,
        mention: Option<String>,
        record: &ResinRecord,
        threshold: u32,
    ) -> Self {
        Self {
            user_key: user_key.to_string(),
            thread_id: thread_id.to_string(),
            mention,
            kind: ReminderKind::ThresholdReached,
            target: threshold,
            fire_at: record.recorded_at + regen::time_to_reach(record.value, threshold),
        }
    }

    /// Overflow reminder: one grace hour after the record reaches the cap.
    pub fn overflow(
        user_key: &str,
        thread_id: &str,
        mention: Option<String>,
        record: &ResinRecord,
    ) -> Self {
        Self {
            user_key: user_key.to_string(),
            thread_id: thread_id.to_string(),
            mention,
            kind: ReminderKind::CapOverflow,
            target: RESIN_CAP,
            fire_at: record.recorded_at
                + regen::time_to_reach(record.value, RESIN_CAP)
                + regen::overflow_grace(),
        }
    }
}

/// Delivery seam. The binary wires this to a chat channel; tests capture.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

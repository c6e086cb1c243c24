//! Delivery of fired reminders through a chat channel.

use std::sync::Arc;

use async_trait::async_trait;

use resinbot_core::error::Result;
use resinbot_core::traits::Channel;
use resinbot_core::types::OutgoingMessage;
use resinbot_scheduler::{Notifier, Reminder, ReminderKind};

use crate::replies;

/// Sends reminder texts out through whatever channel the bot runs on.
pub struct ChannelNotifier {
    channel: Arc<dyn Channel>,
}

impl ChannelNotifier {
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        let text = match reminder.kind {
            ReminderKind::ThresholdReached => replies::threshold_reached(reminder),
            ReminderKind::CapOverflow => replies::overflow_reminder(reminder),
        };
        self.channel
            .send(OutgoingMessage::text(
                self.channel.name(),
                &reminder.thread_id,
                text,
            ))
            .await
    }
}

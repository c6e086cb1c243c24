//! Command handling — orchestrates the store, the calculator, and the
//! scheduler for each incoming message.
//!
//! Stateless per invocation: everything a command needs is read from the
//! record store, and everything it decides is written back or armed on the
//! scheduler before the reply is returned.

use std::sync::Arc;

use chrono::Utc;

use resinbot_core::ResinBotConfig;
use resinbot_core::error::{ResinBotError, Result};
use resinbot_core::regen::{self, RESIN_CAP, ResinRecord};
use resinbot_core::types::{IncomingMessage, ThreadType};
use resinbot_scheduler::{Reminder, ReminderScheduler};
use resinbot_store::{CooldownGuard, RecordStore};

use crate::commands::{self, ResinCommand};
use crate::replies;

pub struct ResinHandler {
    config: ResinBotConfig,
    store: Arc<RecordStore>,
    scheduler: Arc<ReminderScheduler>,
    guard: CooldownGuard,
}

impl ResinHandler {
    pub fn new(
        config: ResinBotConfig,
        store: Arc<RecordStore>,
        scheduler: Arc<ReminderScheduler>,
    ) -> Self {
        Self {
            config,
            store,
            scheduler,
            guard: CooldownGuard::new(),
        }
    }

    /// Route one incoming message. None when it isn't a resin command;
    /// rejections come back as reply text, never as errors.
    pub fn handle(&self, msg: &IncomingMessage) -> Option<String> {
        let names = self.config.command_names();
        let command = commands::parse(&msg.content, &names)?;
        let result = match command {
            ResinCommand::Query => self.query(&msg.sender_id),
            ResinCommand::Update(requested) => self.update(msg, requested),
        };
        Some(result.unwrap_or_else(|e| replies::rejection(&e)))
    }

    /// Update path: validate, overwrite the record, re-arm reminders.
    fn update(&self, msg: &IncomingMessage, requested: i64) -> Result<String> {
        let threshold = self.config.threshold;
        if !(0..=RESIN_CAP as i64).contains(&requested) {
            return Err(ResinBotError::OutOfRange { value: requested });
        }
        let value = requested as u32;
        if value >= threshold {
            return Err(ResinBotError::AboveThreshold { value, threshold });
        }
        if !self.guard.try_acquire(&msg.sender_id) {
            return Err(ResinBotError::TooSoon);
        }

        let record = ResinRecord::new(value, Utc::now());
        // The row must stay readable until the overflow grace window closes.
        let expires_at = record.recorded_at
            + regen::time_to_reach(value, RESIN_CAP)
            + regen::overflow_grace();
        self.store
            .put(&msg.sender_id, &msg.thread_id, &record, expires_at)?;

        let mention = match msg.thread_type {
            ThreadType::Group => msg.sender_name.clone(),
            ThreadType::Direct => None,
        };
        let reminder = Reminder::threshold(
            &msg.sender_id,
            &msg.thread_id,
            mention.clone(),
            &record,
            threshold,
        );
        let reach_at = reminder.fire_at;
        self.scheduler.arm(reminder);
        if self.config.notify_overflow {
            self.scheduler.arm(Reminder::overflow(
                &msg.sender_id,
                &msg.thread_id,
                mention,
                &record,
            ));
        }

        Ok(replies::saved(value, threshold, reach_at))
    }

    /// Query path: project the stored record to now and clamp for display.
    fn query(&self, user_key: &str) -> Result<String> {
        let record = self
            .store
            .get(user_key)?
            .ok_or(ResinBotError::NoRecord)?;
        let projected = regen::project(&record, Utc::now());
        let (shown, excess) = regen::clamp_display(projected);
        Ok(if excess > 0 {
            replies::overflowed(excess)
        } else {
            replies::status(shown)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use resinbot_scheduler::Notifier;
    use std::sync::Mutex;

    struct NullNotifier {
        delivered: Mutex<Vec<Reminder>>,
    }

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, reminder: &Reminder) -> Result<()> {
            self.delivered.lock().unwrap().push(reminder.clone());
            Ok(())
        }
    }

    fn handler() -> ResinHandler {
        handler_with(ResinBotConfig::default())
    }

    fn handler_with(config: ResinBotConfig) -> ResinHandler {
        let store = Arc::new(RecordStore::open_in_memory().unwrap());
        let notifier = Arc::new(NullNotifier {
            delivered: Mutex::new(Vec::new()),
        });
        let scheduler = Arc::new(ReminderScheduler::new(notifier));
        ResinHandler::new(config, store, scheduler)
    }

    fn message(content: &str) -> IncomingMessage {
        IncomingMessage {
            channel: "telegram".into(),
            thread_id: "chat-1".into(),
            sender_id: "user-1".into(),
            sender_name: Some("Aether".into()),
            content: content.into(),
            thread_type: ThreadType::Direct,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unrelated_messages_are_not_commands() {
        let handler = handler();
        assert!(handler.handle(&message("good morning")).is_none());
    }

    #[tokio::test]
    async fn update_replies_with_value_and_threshold() {
        let handler = handler();
        let reply = handler.handle(&message("resin 10")).unwrap();
        assert!(reply.contains("10"), "reply was: {reply}");
        assert!(reply.contains("150"), "reply was: {reply}");
        assert_eq!(handler.scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn update_arms_overflow_reminder_when_configured() {
        let handler = handler_with(ResinBotConfig {
            notify_overflow: true,
            ..Default::default()
        });
        handler.handle(&message("resin 10")).unwrap();
        assert_eq!(handler.scheduler.pending_count(), 2);
    }

    #[tokio::test]
    async fn cap_is_inclusive_on_the_range_check() {
        // 160 passes the range check and is then rejected by the threshold
        // rule, not as out of range.
        let handler = handler();
        let reply = handler.handle(&message("resin 160")).unwrap();
        assert!(reply.contains("threshold"), "reply was: {reply}");

        let reply = handler.handle(&message("resin 161")).unwrap();
        assert!(reply.contains("not a valid"), "reply was: {reply}");

        let reply = handler.handle(&message("resin -1")).unwrap();
        assert!(reply.contains("not a valid"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn second_update_within_the_hour_is_too_soon() {
        let handler = handler();
        handler.handle(&message("resin 10")).unwrap();
        let reply = handler.handle(&message("resin 20")).unwrap();
        assert!(reply.contains("less than an hour"), "reply was: {reply}");

        // The first record must still be in place.
        let record = handler.store.get("user-1").unwrap().unwrap();
        assert_eq!(record.value, 10);
    }

    #[tokio::test]
    async fn query_without_record_says_so() {
        let handler = handler();
        let reply = handler.handle(&message("resin")).unwrap();
        assert!(reply.contains("No resin record"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn query_projects_the_stored_record() {
        let handler = handler();
        // 100 resin recorded 80 minutes ago projects to 110.
        let record = ResinRecord::new(100, Utc::now() - Duration::minutes(80));
        handler
            .store
            .put("user-1", "chat-1", &record, Utc::now() + Duration::hours(24))
            .unwrap();
        let reply = handler.handle(&message("resin")).unwrap();
        assert!(reply.contains("110"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn query_reports_overflow_past_the_cap() {
        let handler = handler();
        // 100 resin recorded 800 minutes ago projects to 200: cap + 40.
        let record = ResinRecord::new(100, Utc::now() - Duration::minutes(800));
        handler
            .store
            .put("user-1", "chat-1", &record, Utc::now() + Duration::hours(24))
            .unwrap();
        let reply = handler.handle(&message("resin")).unwrap();
        assert!(reply.contains("160"), "reply was: {reply}");
        assert!(reply.contains("40"), "reply was: {reply}");
    }
}

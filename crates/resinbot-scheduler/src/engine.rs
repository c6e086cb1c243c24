//! Reminder engine — one cancellable tokio timer per (user, kind).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::task::JoinHandle;

use resinbot_core::config::ResinBotConfig;
use resinbot_core::regen;
use resinbot_store::StoredRecord;

use crate::reminder::{Notifier, Reminder, ReminderKind};

type TaskKey = (String, ReminderKind);

/// Arms, replaces, and cancels one-shot reminder tasks.
///
/// At most one task is outstanding per (user, kind). Arming again for the
/// same key aborts the pending task under the map lock before the
/// replacement is spawned, so a superseded reminder can never fire.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    tasks: Mutex<HashMap<TaskKey, JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Arm (or re-arm) a reminder. A fire time at or before now fires
    /// immediately. Delivery failures are logged and dropped — the next
    /// query recomputes truth from the store regardless.
    pub fn arm(&self, reminder: Reminder) {
        let key = (reminder.user_key.clone(), reminder.kind);
        // Negative delays collapse to zero: already past the target.
        let delay = (reminder.fire_at - Utc::now()).to_std().unwrap_or_default();

        let mut tasks = self.lock();
        if let Some(previous) = tasks.remove(&key) {
            previous.abort();
            tracing::debug!(
                "superseded pending {:?} reminder for {}",
                reminder.kind,
                reminder.user_key
            );
        }

        tracing::info!(
            "📅 armed {:?} reminder for {} in {}s",
            reminder.kind,
            reminder.user_key,
            delay.as_secs()
        );
        let notifier = Arc::clone(&self.notifier);
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            tracing::info!(
                "🔔 {:?} reminder fired for {}",
                reminder.kind,
                reminder.user_key
            );
            if let Err(e) = notifier.notify(&reminder).await {
                tracing::warn!(
                    "⚠️ reminder delivery failed for {}: {e}",
                    reminder.user_key
                );
            }
        });
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.insert(key, handle);
    }

    /// Cancel the pending reminder for (user, kind). True if one was pending.
    pub fn cancel(&self, user_key: &str, kind: ReminderKind) -> bool {
        match self.lock().remove(&(user_key.to_string(), kind)) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel everything pending for a user.
    pub fn cancel_user(&self, user_key: &str) {
        for kind in [ReminderKind::ThresholdReached, ReminderKind::CapOverflow] {
            self.cancel(user_key, kind);
        }
    }

    /// Number of not-yet-fired tasks.
    pub fn pending_count(&self) -> usize {
        let mut tasks = self.lock();
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }

    /// Best-effort startup recovery: re-arm reminders for stored records
    /// whose projected count has not yet reached the threshold. Records
    /// already at or past it are skipped — a stale reminder for an old
    /// record is worse than none.
    pub fn rearm_from_records(&self, records: &[StoredRecord], config: &ResinBotConfig) -> usize {
        let now = Utc::now();
        let mut recovered = 0;
        for stored in records {
            if regen::project(&stored.record, now) >= config.threshold {
                continue;
            }
            self.arm(Reminder::threshold(
                &stored.user_key,
                &stored.thread_id,
                None,
                &stored.record,
                config.threshold,
            ));
            if config.notify_overflow {
                self.arm(Reminder::overflow(
                    &stored.user_key,
                    &stored.thread_id,
                    None,
                    &stored.record,
                ));
            }
            recovered += 1;
        }
        if recovered > 0 {
            tracing::info!("recovered {recovered} pending reminder task(s) from the record store");
        } else {
            tracing::info!("no pending reminder tasks found in the record store");
        }
        recovered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TaskKey, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use resinbot_core::ResinRecord;
    use resinbot_core::error::Result;
    use std::time::Duration;

    /// Captures delivered reminders instead of sending them anywhere.
    struct CaptureNotifier {
        delivered: Mutex<Vec<Reminder>>,
    }

    impl CaptureNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
            })
        }

        fn delivered(&self) -> Vec<Reminder> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for CaptureNotifier {
        async fn notify(&self, reminder: &Reminder) -> Result<()> {
            self.delivered.lock().unwrap().push(reminder.clone());
            Ok(())
        }
    }

    fn reminder_in(ms: i64, target: u32) -> Reminder {
        Reminder {
            user_key: "user-1".into(),
            thread_id: "chat-1".into(),
            mention: None,
            kind: ReminderKind::ThresholdReached,
            target,
            fire_at: Utc::now() + ChronoDuration::milliseconds(ms),
        }
    }

    #[tokio::test]
    async fn past_fire_time_fires_immediately() {
        let notifier = CaptureNotifier::new();
        let scheduler = ReminderScheduler::new(notifier.clone());
        scheduler.arm(reminder_in(-60_000, 150));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(notifier.delivered().len(), 1);
    }

    #[tokio::test]
    async fn rearming_supersedes_the_pending_task() {
        let notifier = CaptureNotifier::new();
        let scheduler = ReminderScheduler::new(notifier.clone());
        scheduler.arm(reminder_in(80, 150));
        scheduler.arm(reminder_in(160, 140));
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Only the second reminder may ever fire.
        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].target, 140);
    }

    #[tokio::test]
    async fn cancel_prevents_delivery() {
        let notifier = CaptureNotifier::new();
        let scheduler = ReminderScheduler::new(notifier.clone());
        scheduler.arm(reminder_in(80, 150));
        assert!(scheduler.cancel("user-1", ReminderKind::ThresholdReached));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(notifier.delivered().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn kinds_are_tracked_independently() {
        let notifier = CaptureNotifier::new();
        let scheduler = ReminderScheduler::new(notifier.clone());
        let record = ResinRecord::new(10, Utc::now());
        scheduler.arm(Reminder::threshold("user-1", "chat-1", None, &record, 150));
        scheduler.arm(Reminder::overflow("user-1", "chat-1", None, &record));
        assert_eq!(scheduler.pending_count(), 2);
        scheduler.cancel_user("user-1");
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn recovery_skips_records_past_threshold() {
        let notifier = CaptureNotifier::new();
        let scheduler = ReminderScheduler::new(notifier.clone());
        let config = ResinBotConfig::default();
        let far_future = Utc::now() + ChronoDuration::hours(24);

        let records = vec![
            StoredRecord {
                user_key: "fresh".into(),
                thread_id: "chat-1".into(),
                record: ResinRecord::new(10, Utc::now()),
                expires_at: far_future,
            },
            StoredRecord {
                user_key: "stale".into(),
                thread_id: "chat-2".into(),
                // 800 minutes ago: projects to 200, past any threshold.
                record: ResinRecord::new(100, Utc::now() - ChronoDuration::minutes(800)),
                expires_at: far_future,
            },
        ];

        assert_eq!(scheduler.rearm_from_records(&records, &config), 1);
        assert_eq!(scheduler.pending_count(), 1);
    }
}

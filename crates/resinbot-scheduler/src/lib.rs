//! # ResinBot Scheduler
//!
//! One-shot, cancellable reminder tasks on tokio timers. No cron
//! expressions, no tick loop: every reminder has an exact fire time computed
//! from the regeneration rate, so each one is a single `sleep` that can be
//! aborted when a newer record supersedes it.
//!
//! ## Architecture
//! ```text
//! update command
//!   └── arm(Reminder { user, chat, kind, fire_at })
//!         ├── abort pending task for (user, kind)   [cancel-before-arm]
//!         └── spawn: sleep until fire_at → Notifier::notify(reminder)
//!
//! startup
//!   └── rearm_from_records(store rows) — best-effort recovery
//! ```

pub mod engine;
pub mod reminder;

pub use engine::ReminderScheduler;
pub use reminder::{Notifier, Reminder, ReminderKind};

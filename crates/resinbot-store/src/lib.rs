//! # ResinBot Store
//!
//! One resin record per user, kept in SQLite so reminders can be re-armed
//! after a restart, plus the in-memory cooldown guard that suppresses
//! duplicate updates.

pub mod guard;
pub mod records;

pub use guard::CooldownGuard;
pub use records::{RecordStore, StoredRecord};

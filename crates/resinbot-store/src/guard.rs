//! Advisory cooldown guard.
//!
//! Suppresses a second update from the same user inside a fixed window,
//! mirroring the scheduler's supersede contract and keeping reminder churn
//! down. Soft lock only: in-memory, entries expire on their own, nothing is
//! persisted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use resinbot_core::regen::COOLDOWN_SECS;

pub struct CooldownGuard {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl CooldownGuard {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(COOLDOWN_SECS))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Start a cooldown for `key`. Returns false while a previous
    /// acquisition is still inside the window.
    pub fn try_acquire(&self, key: &str) -> bool {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries.retain(|_, armed| now.duration_since(*armed) < self.window);
        if entries.contains_key(key) {
            return false;
        }
        entries.insert(key.to_string(), now);
        true
    }
}

impl Default for CooldownGuard {
    fn default() -> Self {
        Self::new()
    }
}

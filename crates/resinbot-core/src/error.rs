//! ResinBot error types.
//!
//! The first four variants are user-input/state validation — they surface as
//! chat replies, never as process faults. The rest are infrastructure errors
//! at the config/store/channel boundaries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResinBotError>;

#[derive(Debug, Error)]
pub enum ResinBotError {
    /// Requested value is outside the valid 0..=cap range.
    #[error("requested value {value} is outside the valid resin range")]
    OutOfRange { value: i64 },

    /// Requested value is already at or above the reminder threshold.
    #[error("requested value {value} is already at or above the threshold {threshold}")]
    AboveThreshold { value: u32, threshold: u32 },

    /// Update rejected by the advisory cooldown window.
    #[error("an update for this user was accepted less than an hour ago")]
    TooSoon,

    /// Query before any record was ever written for this user.
    #[error("no resin record exists for this user")]
    NoRecord,

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ResinBotError {
    /// Whether this error is a user-visible rejection rather than an
    /// infrastructure fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::AboveThreshold { .. } | Self::TooSoon | Self::NoRecord
        )
    }
}

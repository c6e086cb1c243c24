//! # ResinBot Channels
//!
//! Chat channel implementations. Telegram is the only channel today; the
//! [`resinbot_core::traits::Channel`] seam keeps the bot core unaware of it.

pub mod telegram;

pub use telegram::{TelegramChannel, TelegramPollingStream};

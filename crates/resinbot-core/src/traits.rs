//! Trait seams between the bot and host-provided services.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::OutgoingMessage;

/// A chat channel the bot can speak through.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name, e.g. "telegram".
    fn name(&self) -> &str;

    /// Verify connectivity and credentials before the bot starts serving.
    async fn connect(&mut self) -> Result<()>;

    /// Deliver a message.
    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}

//! Telegram Bot channel — long polling in, `sendMessage` out.
//!
//! Replies and reminders are sent as plain text (no parse mode), so resin
//! counts and user names never need markup escaping.

use async_trait::async_trait;
use futures::stream::Stream;
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};

use resinbot_core::config::TelegramConfig;
use resinbot_core::error::{ResinBotError, Result};
use resinbot_core::traits::Channel;
use resinbot_core::types::{IncomingMessage, OutgoingMessage, ThreadType};

/// Telegram Bot API channel.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    last_update_id: i64,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            last_update_id: 0,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{}",
            self.config.bot_token, method
        )
    }

    /// One long-polling round. Advances the update offset past everything
    /// returned so no update is delivered twice.
    pub async fn get_updates(&mut self) -> Result<Vec<TelegramUpdate>> {
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("offset", (self.last_update_id + 1).to_string()),
                ("timeout", "30".into()),
                ("allowed_updates", "[\"message\"]".into()),
            ])
            .send()
            .await
            .map_err(|e| ResinBotError::Channel(format!("Telegram getUpdates failed: {e}")))?;

        let body: TelegramApiResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| ResinBotError::Channel(format!("invalid Telegram response: {e}")))?;

        if !body.ok {
            return Err(ResinBotError::Channel(format!(
                "Telegram API error: {}",
                body.description.unwrap_or_default()
            )));
        }

        let updates = body.result.unwrap_or_default();
        if let Some(last) = updates.last() {
            self.last_update_id = last.update_id;
        }
        Ok(updates)
    }

    /// Send a plain-text message to a chat.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ResinBotError::Channel(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ResinBotError::Channel(format!("invalid send response: {e}")))?;

        if !result.ok {
            return Err(ResinBotError::Channel(format!(
                "send failed: {}",
                result.description.unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Fetch the bot's own identity — doubles as a credential check.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ResinBotError::Channel(format!("getMe failed: {e}")))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| ResinBotError::Channel(format!("invalid getMe response: {e}")))?;
        body.result
            .ok_or_else(|| ResinBotError::Channel("no bot identity returned".into()))
    }

    /// Start the polling loop, consuming the channel. Returns a stream of
    /// incoming messages; the loop ends when the receiver is dropped.
    pub fn start_polling(self) -> TelegramPollingStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut channel = self;
            tracing::info!("Telegram polling loop started");

            loop {
                match channel.get_updates().await {
                    Ok(updates) => {
                        for update in updates {
                            if let Some(msg) = update.to_incoming()
                                && tx.send(msg).is_err()
                            {
                                tracing::info!("Telegram polling stopped (receiver dropped)");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Telegram polling error: {e}");
                        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(
                    channel.config.poll_interval,
                ))
                .await;
            }
        });

        TelegramPollingStream { rx }
    }
}

/// Stream of incoming Telegram messages from polling.
pub struct TelegramPollingStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<IncomingMessage>,
}

impl Stream for TelegramPollingStream {
    type Item = IncomingMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for TelegramPollingStream {}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn connect(&mut self) -> Result<()> {
        let me = self.get_me().await?;
        tracing::info!(
            "Telegram bot: @{} ({})",
            me.username.as_deref().unwrap_or("unknown"),
            me.first_name
        );
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let chat_id: i64 = message
            .thread_id
            .parse()
            .map_err(|_| ResinBotError::Channel(format!("invalid chat_id {}", message.thread_id)))?;
        self.send_text(chat_id, &message.content).await
    }
}

// --- Telegram API types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

impl TelegramUpdate {
    /// Map a Telegram update onto the bot's message type. Non-text updates
    /// and messages from other bots are dropped.
    pub fn to_incoming(&self) -> Option<IncomingMessage> {
        let msg = self.message.as_ref()?;
        let text = msg.text.as_ref()?;
        let from = msg.from.as_ref()?;

        if from.is_bot {
            return None;
        }

        let sender_name = match &from.last_name {
            Some(last) => format!("{} {last}", from.first_name),
            None => from.first_name.clone(),
        };

        Some(IncomingMessage {
            channel: "telegram".into(),
            thread_id: msg.chat.id.to_string(),
            sender_id: from.id.to_string(),
            sender_name: Some(sender_name),
            content: text.clone(),
            thread_type: match msg.chat.chat_type.as_str() {
                "private" => ThreadType::Direct,
                _ => ThreadType::Group,
            },
            timestamp: chrono::Utc::now(),
        })
    }
}

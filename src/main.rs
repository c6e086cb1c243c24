//! # ResinBot
//!
//! Chat bot that tracks a per-user resin count and sends a reminder once the
//! count is predicted to reach the configured threshold.
//!
//! Usage:
//!   resinbot                      # run with ~/.resinbot/config.toml
//!   resinbot --config bot.toml    # run with a specific config
//!   resinbot --init-config        # write a default config and exit
//!
//! In chat: `resin 10` records your current count and schedules the
//! reminder; a bare `resin` reports the regenerated count so far.

mod commands;
mod handler;
mod notify;
mod replies;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use resinbot_channels::TelegramChannel;
use resinbot_core::ResinBotConfig;
use resinbot_core::traits::Channel;
use resinbot_core::types::OutgoingMessage;
use resinbot_scheduler::ReminderScheduler;
use resinbot_store::RecordStore;

use crate::handler::ResinHandler;
use crate::notify::ChannelNotifier;

#[derive(Parser)]
#[command(
    name = "resinbot",
    version,
    about = "Resin tracker with threshold and overflow reminders"
)]
struct Cli {
    /// Path to the config file (default: ~/.resinbot/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Write a default config file to the default path and exit
    #[arg(long)]
    init_config: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "resinbot=debug"
    } else {
        "resinbot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    if cli.init_config {
        ResinBotConfig::default().save()?;
        println!("wrote {}", ResinBotConfig::default_path().display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            ResinBotConfig::load_from(Path::new(&path))?
        }
        None => ResinBotConfig::load()?,
    };
    config.validate()?;

    let telegram = config
        .channel
        .telegram
        .clone()
        .filter(|tg| tg.enabled && !tg.bot_token.is_empty())
        .context("no enabled telegram channel configured; set channel.telegram.bot_token")?;

    let db_path = PathBuf::from(shellexpand::tilde(&config.store.db_path).to_string());
    let store = Arc::new(RecordStore::open(&db_path)?);
    store.purge_expired()?;

    // One connected instance for outbound sends, one consumed by polling.
    let mut sender = TelegramChannel::new(telegram.clone());
    sender.connect().await?;
    let channel: Arc<dyn Channel> = Arc::new(sender);

    let notifier = Arc::new(ChannelNotifier::new(Arc::clone(&channel)));
    let scheduler = Arc::new(ReminderScheduler::new(notifier));

    // Best-effort recovery: re-arm reminders for records that survived a
    // restart and have not reached the threshold yet.
    let records = store.active_records()?;
    scheduler.rearm_from_records(&records, &config);

    let handler = ResinHandler::new(config, store, scheduler);

    let mut updates = TelegramChannel::new(telegram).start_polling();
    tracing::info!("🤖 resinbot is listening");
    while let Some(msg) = updates.next().await {
        let Some(reply) = handler.handle(&msg) else {
            continue;
        };
        if let Err(e) = channel
            .send(OutgoingMessage::text(&msg.channel, &msg.thread_id, reply))
            .await
        {
            tracing::warn!("⚠️ failed to reply in {}: {e}", msg.thread_id);
        }
    }

    Ok(())
}

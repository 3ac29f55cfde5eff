//! Channel notifier entry point
//!
//! 1. Loads configuration
//! 2. Announces startup in the channel
//! 3. Starts auto push when enabled by default
//! 4. Polls Telegram for commands and messages
//! 5. Shuts everything down on Ctrl+C

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use channel_notifier::adapters::{poll_updates, ChannelTransport, ChatId, TelegramApi};
use channel_notifier::config::{self, constants};
use channel_notifier::core::{
    announce_startup, init_logging, update_loop, AutoPushScheduler, ChannelBundle, ChannelSender,
    CommandDispatcher, PushPipeline, SanitizedValue,
};
use channel_notifier::sources::DataSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    init_logging();

    info!("🚀 Channel notifier starting...");
    constants::log_configuration();

    let config_path = constants::config_path();
    info!("📁 Loading configuration from {}...", config_path.display());
    let config = match config::load_config(&config_path) {
        Ok(cfg) => cfg.into_shared(),
        Err(e) => {
            error!("[ERROR] Configuration failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        token = %SanitizedValue::new(&config.telegram.bot_token),
        channel = %config.telegram.channel_id,
        admins = config.telegram.admin_user_ids.len(),
        interval_secs = config.push.interval_secs,
        auto_push = config.push.auto_push,
        "[CONFIG] Loaded"
    );

    let api = Arc::new(TelegramApi::with_base_url(
        &config.telegram.bot_token,
        &config.telegram.api_base_url,
    ));
    let transport: Arc<dyn ChannelTransport> = api.clone();

    let sender = ChannelSender::new(
        transport.clone(),
        ChatId::parse(&config.telegram.channel_id),
        config.push.max_message_length,
        config.push.chunk_delay(),
    );
    let pipeline = Arc::new(PushPipeline::new(
        DataSource::new(config.sources.clone()),
        sender,
    ));
    info!(source = %pipeline.source_label(), "📡 Data source selected");

    let identity =
        announce_startup(transport.as_ref(), pipeline.sender(), &pipeline.source_label()).await;

    let scheduler = Arc::new(AutoPushScheduler::new(
        pipeline.clone(),
        config.push.interval(),
        config.push.retry_backoff(),
    ));

    let mut dispatcher = CommandDispatcher::new(
        transport.clone(),
        pipeline.clone(),
        scheduler.clone(),
        config.telegram.admin_user_ids.clone(),
    );
    if let Some(me) = identity {
        dispatcher = dispatcher.with_bot_username(me.username);
    }
    let dispatcher = Arc::new(dispatcher);

    if config.push.auto_push {
        scheduler.enable().await;
    }

    let ChannelBundle {
        update_tx,
        update_rx,
        shutdown_tx,
    } = ChannelBundle::new(constants::update_channel_capacity());

    let poller = tokio::spawn(poll_updates(
        api,
        config.telegram.poll_timeout_secs,
        update_tx,
        shutdown_tx.subscribe(),
    ));
    let updates = tokio::spawn(update_loop(dispatcher, update_rx, shutdown_tx.subscribe()));

    info!("⏳ Notifier running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => info!("[SHUTDOWN] Graceful shutdown initiated"),
        Err(err) => error!("[SHUTDOWN] Failed to listen for Ctrl+C signal: {}", err),
    }

    // Broadcast shutdown to all tasks
    let _ = shutdown_tx.send(());
    scheduler.shutdown().await;

    for (name, task) in [("poller", poller), ("update loop", updates)] {
        if let Err(e) = task.await {
            error!(task = name, error = %e, "[SHUTDOWN] Task ended abnormally");
        }
    }

    info!("[SHUTDOWN] Clean exit");
    Ok(())
}

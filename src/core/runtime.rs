//! Runtime tasks
//!
//! The update loop consumes inbound messages from the poller and hands them
//! to the dispatcher, one at a time, until shutdown is broadcast.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::adapters::{BotIdentity, ChannelTransport, InboundMessage};
use crate::config::constants::TIMESTAMP_FORMAT;
use crate::core::commands::CommandDispatcher;
use crate::core::format::render_startup;
use crate::core::sender::ChannelSender;

/// Process inbound messages until shutdown or until the poller goes away.
pub async fn update_loop(
    dispatcher: Arc<CommandDispatcher>,
    mut update_rx: mpsc::Receiver<InboundMessage>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Update loop started");
    let mut handled: u64 = 0;

    loop {
        tokio::select! {
            // Shutdown takes priority
            biased;
            _ = shutdown_rx.recv() => {
                info!(handled, "[SHUTDOWN] Update loop shutting down");
                break;
            }
            update = update_rx.recv() => {
                let Some(msg) = update else {
                    warn!(handled, "Update channel closed, stopping update loop");
                    break;
                };
                handled += 1;
                dispatcher.handle(&msg).await;
            }
        }
    }
}

/// Identify the bot and announce startup in the channel.
///
/// Failures are logged; startup carries on without the announcement.
pub async fn announce_startup(
    transport: &dyn ChannelTransport,
    sender: &ChannelSender,
    source_label: &str,
) -> Option<BotIdentity> {
    let identity = match transport.get_me().await {
        Ok(me) => {
            info!(bot = %me.username, "Bot connected: @{}", me.username);
            me
        }
        Err(e) => {
            error!(error = %e, "[STARTUP] Could not identify bot");
            return None;
        }
    };

    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let announcement = render_startup(&identity.username, source_label, &timestamp);
    if !sender.send_report(&announcement).await {
        warn!("[STARTUP] Startup announcement was not delivered");
    }

    Some(identity)
}

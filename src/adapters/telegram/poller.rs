//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Converts every `message`/`channel_post` into an [`InboundMessage`] and
//! forwards it to the update loop. Updates queued before startup are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::adapters::types::InboundMessage;
use crate::config::constants::poll_max_backoff;

use super::api::TelegramApi;

/// Skip everything that queued up while the bot was offline.
///
/// Returns the offset to start polling from.
async fn drop_pending_updates(api: &TelegramApi) -> Option<i64> {
    match api.get_updates(Some(-1), 0).await {
        Ok(updates) => {
            let last = updates.last().map(|u| u.update_id + 1);
            if let Some(offset) = last {
                debug!(offset, "Dropped pending updates");
            }
            last
        }
        Err(e) => {
            warn!(error = %e, "Could not drop pending updates");
            None
        }
    }
}

/// Run the long-polling loop until shutdown is broadcast.
pub async fn poll_updates(
    api: Arc<TelegramApi>,
    poll_timeout_secs: u64,
    update_tx: mpsc::Sender<InboundMessage>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let max_backoff = poll_max_backoff();
    let mut backoff = Duration::from_secs(1);
    let mut offset = drop_pending_updates(&api).await;

    info!("Telegram poller started");

    loop {
        let updates = tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Telegram poller shutting down");
                return;
            }
            result = api.get_updates(offset, poll_timeout_secs) => result,
        };

        match updates {
            Ok(updates) => {
                backoff = Duration::from_secs(1);

                for update in updates {
                    offset = Some(update.update_id + 1);

                    let Some(message) = update.into_message() else {
                        continue;
                    };

                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            info!("Telegram poller shutting down");
                            return;
                        }
                        sent = update_tx.send(InboundMessage::from(message)) => {
                            if sent.is_err() {
                                warn!("Update channel closed, stopping poller");
                                return;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_secs = backoff.as_secs(), "getUpdates failed, backing off");
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Telegram poller shutting down");
                        return;
                    }
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }
}

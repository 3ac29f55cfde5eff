//! Channel bundle for inter-task communication
//!
//! The poller feeds inbound messages to the update loop over `mpsc`;
//! shutdown is broadcast from `main` to every task.

use tokio::sync::{broadcast, mpsc};

use crate::adapters::InboundMessage;

/// Default capacity for the inbound update channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Bundle of all inter-task communication channels
#[derive(Debug)]
pub struct ChannelBundle {
    /// Poller -> update loop: inbound messages and channel posts
    pub update_tx: mpsc::Sender<InboundMessage>,
    pub update_rx: mpsc::Receiver<InboundMessage>,

    /// Shutdown broadcast: main -> all tasks
    pub shutdown_tx: broadcast::Sender<()>,
}

impl ChannelBundle {
    pub fn new(capacity: usize) -> Self {
        let (update_tx, update_rx) = mpsc::channel(capacity);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            update_tx,
            update_rx,
            shutdown_tx,
        }
    }

    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}

impl Default for ChannelBundle {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

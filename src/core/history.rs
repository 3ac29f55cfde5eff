//! Bounded history of received messages

use std::collections::VecDeque;

use crate::adapters::InboundMessage;
use crate::config::constants::{HISTORY_CAPACITY, NON_TEXT_PLACEHOLDER};

/// One inbound message as recorded for `/messages`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub timestamp: String,
    pub from: String,
    pub chat_kind: String,
    pub chat_id: i64,
    /// Message text, or the media placeholder
    pub text: String,
    pub message_id: i64,
}

impl ReceivedMessage {
    pub fn from_inbound(msg: &InboundMessage, timestamp: String) -> Self {
        Self {
            timestamp,
            from: msg.sender_name.clone(),
            chat_kind: msg.chat_kind.clone(),
            chat_id: msg.chat_id,
            text: msg
                .text
                .clone()
                .unwrap_or_else(|| NON_TEXT_PLACEHOLDER.to_string()),
            message_id: msg.message_id,
        }
    }
}

/// Insertion-ordered buffer that evicts its oldest entries past capacity
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<ReceivedMessage>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, message: ReceivedMessage) {
        self.entries.push_back(message);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Last `n` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<ReceivedMessage> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared test utilities for transport testing
//!
//! Provides a configurable `RecordingTransport` used by the sender,
//! scheduler and dispatcher test modules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::adapters::errors::{TransportError, TransportResult};
use crate::adapters::traits::ChannelTransport;
use crate::adapters::types::{BotIdentity, ChatId};

/// Mock transport that records every message it is asked to send
pub struct RecordingTransport {
    /// Every successfully "sent" (chat, text) pair in order
    sent: Mutex<Vec<(ChatId, String)>>,
    /// When true, every send fails
    fail_all: AtomicBool,
    /// Zero-based call indices that fail
    fail_calls: Mutex<HashSet<usize>>,
    /// Total send attempts, including failed ones
    attempts: AtomicUsize,
    /// (chat, reply_to) of every delivered threaded reply
    replies: Mutex<Vec<(ChatId, i64)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: AtomicBool::new(false),
            fail_calls: Mutex::new(HashSet::new()),
            attempts: AtomicUsize::new(0),
            replies: Mutex::new(Vec::new()),
        }
    }

    /// Create a transport whose sends always fail
    pub fn failing() -> Self {
        let transport = Self::new();
        transport.set_failing(true);
        transport
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Make the `index`-th send attempt (zero-based) fail
    pub fn fail_call(&self, index: usize) {
        self.fail_calls.lock().unwrap().insert(index);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Message ids that delivered replies were threaded under, per chat
    pub fn reply_targets(&self, chat: &ChatId) -> Vec<i64> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == chat)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Texts delivered to one chat, in order
    pub fn sent_to(&self, chat: &ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| c == chat)
            .map(|(_, text)| text)
            .collect()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelTransport for RecordingTransport {
    async fn send_message(&self, chat: &ChatId, text: &str) -> TransportResult<i64> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        let scheduled_failure = self.fail_calls.lock().unwrap().contains(&index);

        if self.fail_all.load(Ordering::SeqCst) || scheduled_failure {
            return Err(TransportError::Api {
                code: Some(500),
                description: "mock transport failure".to_string(),
            });
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push((chat.clone(), text.to_string()));
        Ok(sent.len() as i64)
    }

    async fn send_reply(&self, chat: &ChatId, reply_to: i64, text: &str) -> TransportResult<i64> {
        let id = self.send_message(chat, text).await?;
        self.replies.lock().unwrap().push((chat.clone(), reply_to));
        Ok(id)
    }

    async fn get_me(&self) -> TransportResult<BotIdentity> {
        Ok(BotIdentity {
            id: 1,
            username: "mock_bot".to_string(),
        })
    }
}

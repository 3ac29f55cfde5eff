//! Telegram Bot API transport
//!
//! `api` implements [`ChannelTransport`](crate::adapters::ChannelTransport)
//! over HTTPS; `poller` delivers inbound updates by long polling.

pub mod api;
pub mod poller;
pub mod types;

pub use api::TelegramApi;
pub use poller::poll_updates;

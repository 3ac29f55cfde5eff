//! One push cycle: acquire -> format -> chunk -> deliver
//!
//! Shared by the scheduler and the manual `/push` command.

use chrono::Local;
use tracing::info;

use crate::config::constants::TIMESTAMP_FORMAT;
use crate::core::format::render_report;
use crate::core::sender::ChannelSender;
use crate::sources::DataSource;

pub struct PushPipeline {
    source: DataSource,
    sender: ChannelSender,
}

impl PushPipeline {
    pub fn new(source: DataSource, sender: ChannelSender) -> Self {
        Self { source, sender }
    }

    pub fn source_label(&self) -> String {
        self.source.label()
    }

    pub fn sender(&self) -> &ChannelSender {
        &self.sender
    }

    /// Run one full cycle. Returns whether every chunk was delivered.
    pub async fn run_cycle(&self) -> bool {
        let payload = self.source.acquire().await;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let report = render_report(&payload, &self.source.label(), &timestamp);

        let delivered = self.sender.send_report(&report).await;
        info!(delivered, chars = report.chars().count(), "[PUSH] Cycle finished");
        delivered
    }
}

//! Operator command handling and inbound message routing
//!
//! Every command goes through the allow-list first. Non-command messages are
//! recorded in history and may trigger the keyword auto-reply.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::adapters::{ChannelTransport, ChatId, InboundMessage};
use crate::config::constants::{
    AUTO_REPLY_KEYWORDS, MESSAGE_PREVIEW_CHARS, RECENT_MESSAGES_SHOWN, TIMESTAMP_FORMAT,
};
use crate::core::format::escape_html;
use crate::core::history::{HistoryBuffer, ReceivedMessage};
use crate::core::pipeline::PushPipeline;
use crate::core::scheduler::{AutoPushScheduler, SchedulerState};

pub const REJECTION_TEXT: &str = "❌ You don't have permission to use this bot.";
pub const STOPPED_TEXT: &str = "⏹️ Auto push stopped!";
pub const AUTOPUSH_DISABLED_TEXT: &str = "⏸️ Auto push disabled!";
pub const AUTOPUSH_ENABLED_TEXT: &str = "▶️ Auto push enabled!";
pub const PUSH_ACK_TEXT: &str = "📤 Pushing data manually...";
pub const PUSH_OK_TEXT: &str = "✅ Data pushed successfully!";
pub const PUSH_FAILED_TEXT: &str = "❌ Failed to push data. Check logs for details.";
pub const NO_MESSAGES_TEXT: &str = "📭 No messages received yet.";

const AUTO_REPLY_TEXT: &str = "🤖 <b>Auto Reply</b>\n\
    I received your message! Use /help to see available commands.\n\
    Admins can control the bot using commands.";

const WELCOME_TEXT: &str = "🤖 <b>Telegram Interactive Bot Started</b>\n\
    \n\
    <b>Available Commands:</b>\n\
    /start - Start the bot\n\
    /stop - Stop auto push\n\
    /status - Show bot status\n\
    /push - Manual data push\n\
    /autopush - Toggle auto push on/off\n\
    /messages - Show recent received messages\n\
    /help - Show this help message\n\
    \n\
    Bot is now ready to receive and send messages! 🚀";

/// The operator command set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Status,
    Push,
    AutoPush,
    Messages,
    Help,
}

/// Result of classifying an inbound text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Command(Command),
    /// Slash command we don't serve, or one addressed to another bot
    Ignored,
    Plain,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            "status" => Some(Command::Status),
            "push" => Some(Command::Push),
            "autopush" => Some(Command::AutoPush),
            "messages" => Some(Command::Messages),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// Classify `text` as `/cmd`, `/cmd@bot args` or plain text.
    ///
    /// A command carrying a different bot's username is ignored.
    pub fn classify(text: &str, bot_username: Option<&str>) -> Classified {
        let Some(rest) = text.trim_start().strip_prefix('/') else {
            return Classified::Plain;
        };

        let token = rest.split_whitespace().next().unwrap_or("");
        let (name, target) = match token.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (token, None),
        };

        if let (Some(target), Some(me)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(me) {
                return Classified::Ignored;
            }
        }

        match Command::from_name(name) {
            Some(cmd) => Classified::Command(cmd),
            None => Classified::Ignored,
        }
    }
}

/// Routes inbound messages to commands, history and the auto-reply
pub struct CommandDispatcher {
    transport: Arc<dyn ChannelTransport>,
    pipeline: Arc<PushPipeline>,
    scheduler: Arc<AutoPushScheduler>,
    history: Mutex<HistoryBuffer>,
    admin_user_ids: Vec<i64>,
    bot_username: Option<String>,
}

impl CommandDispatcher {
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        pipeline: Arc<PushPipeline>,
        scheduler: Arc<AutoPushScheduler>,
        admin_user_ids: Vec<i64>,
    ) -> Self {
        Self {
            transport,
            pipeline,
            scheduler,
            history: Mutex::new(HistoryBuffer::new()),
            admin_user_ids,
            bot_username: None,
        }
    }

    /// Only accept `/cmd@name` when `name` is this bot
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// An empty allow-list admits everyone; otherwise the caller must be listed.
    pub fn is_authorized(&self, user_id: Option<i64>) -> bool {
        if self.admin_user_ids.is_empty() {
            return true;
        }
        user_id.is_some_and(|id| self.admin_user_ids.contains(&id))
    }

    pub fn history_len(&self) -> usize {
        self.history().len()
    }

    pub fn recent_messages(&self, n: usize) -> Vec<ReceivedMessage> {
        self.history().recent(n)
    }

    fn history(&self) -> MutexGuard<'_, HistoryBuffer> {
        // Appends cannot leave the buffer half-updated, so a poisoned lock is still usable
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Handle one inbound message from the transport.
    pub async fn handle(&self, msg: &InboundMessage) {
        let classified = match &msg.text {
            Some(text) => Command::classify(text, self.bot_username.as_deref()),
            None => Classified::Plain,
        };

        match classified {
            Classified::Command(cmd) => self.execute(cmd, msg).await,
            Classified::Ignored => {
                debug!(chat_id = msg.chat_id, text = ?msg.text, "[COMMAND] Ignoring unknown command");
            }
            Classified::Plain => self.record(msg).await,
        }
    }

    async fn execute(&self, cmd: Command, msg: &InboundMessage) {
        if !self.is_authorized(msg.sender_id) {
            warn!(
                command = ?cmd,
                user_id = ?msg.sender_id,
                "[COMMAND] Rejected unauthorized caller"
            );
            self.reply(msg, REJECTION_TEXT).await;
            return;
        }

        info!(command = ?cmd, user_id = ?msg.sender_id, "[COMMAND] Executing");

        match cmd {
            Command::Start => self.reply(msg, WELCOME_TEXT).await,
            Command::Stop => {
                self.scheduler.disable();
                self.reply(msg, STOPPED_TEXT).await;
            }
            Command::Status => {
                let status = self.render_status();
                self.reply(msg, &status).await;
            }
            Command::Push => {
                self.reply(msg, PUSH_ACK_TEXT).await;
                let outcome = if self.pipeline.run_cycle().await {
                    PUSH_OK_TEXT
                } else {
                    PUSH_FAILED_TEXT
                };
                self.reply(msg, outcome).await;
            }
            Command::AutoPush => {
                let text = match self.scheduler.toggle().await {
                    SchedulerState::Running => AUTOPUSH_ENABLED_TEXT,
                    SchedulerState::Disabled => AUTOPUSH_DISABLED_TEXT,
                };
                self.reply(msg, text).await;
            }
            Command::Messages => {
                let listing = self.render_recent();
                self.reply(msg, &listing).await;
            }
            Command::Help => {
                let help = self.render_help();
                self.reply(msg, &help).await;
            }
        }
    }

    async fn record(&self, msg: &InboundMessage) {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let entry = ReceivedMessage::from_inbound(msg, timestamp);
        info!(
            from = %entry.from,
            preview = %entry.text.chars().take(50).collect::<String>(),
            "[COMMAND] Received message"
        );
        self.history().append(entry);

        // Replying to a channel post would publish into the channel
        if msg.chat_kind == "channel" {
            return;
        }

        let Some(text) = &msg.text else {
            return;
        };
        let lowered = text.to_lowercase();
        if AUTO_REPLY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            self.reply(msg, AUTO_REPLY_TEXT).await;
        }
    }

    /// Answer `msg` in its own chat, threaded under it.
    async fn reply(&self, msg: &InboundMessage, text: &str) {
        let chat = ChatId::Id(msg.chat_id);
        if let Err(e) = self.transport.send_reply(&chat, msg.message_id, text).await {
            error!(chat = %chat, error = %e, "[COMMAND] Failed to send reply");
        }
    }

    fn on_off(&self) -> &'static str {
        if self.scheduler.is_enabled() {
            "ON"
        } else {
            "OFF"
        }
    }

    fn render_status(&self) -> String {
        format!(
            "📊 <b>Bot Status Report</b>\n\
             ⏰ <b>Current Time:</b> <code>{}</code>\n\
             🔄 <b>Auto Push:</b> <code>{}</code>\n\
             📡 <b>Data Source:</b> <code>{}</code>\n\
             🔔 <b>Push Interval:</b> <code>{} seconds</code>\n\
             📬 <b>Received Messages:</b> <code>{}</code>\n\
             🎯 <b>Target Channel:</b> <code>{}</code>",
            Local::now().format(TIMESTAMP_FORMAT),
            self.on_off(),
            escape_html(&self.pipeline.source_label()),
            self.scheduler.interval().as_secs(),
            self.history_len(),
            escape_html(&self.pipeline.sender().channel().to_string()),
        )
    }

    fn render_help(&self) -> String {
        format!(
            "🤖 <b>Telegram Interactive Bot Help</b>\n\
             \n\
             <b>Commands:</b>\n\
             /start - Initialize the bot\n\
             /stop - Stop automatic data pushing\n\
             /status - Show current bot status\n\
             /push - Manually push data to channel\n\
             /autopush - Toggle automatic pushing on/off\n\
             /messages - Show recent received messages\n\
             /help - Show this help message\n\
             \n\
             <b>Features:</b>\n\
             • Automatically push data to configured channel\n\
             • Receive and log messages from channels/users\n\
             • Admin control with permission system\n\
             • Multiple data sources (journal, URL, file, sample data)\n\
             • Message formatting and splitting for long content\n\
             \n\
             <b>Bot Status:</b>\n\
             Auto Push: {}\n\
             Data Source: {}",
            self.on_off(),
            escape_html(&self.pipeline.source_label()),
        )
    }

    fn render_recent(&self) -> String {
        let recent = self.recent_messages(RECENT_MESSAGES_SHOWN);
        if recent.is_empty() {
            return NO_MESSAGES_TEXT.to_string();
        }

        let mut out = String::from("📬 <b>Recent Received Messages:</b>\n\n");
        for (i, entry) in recent.iter().enumerate() {
            out.push_str(&format!("<b>{}.</b> <code>{}</code>\n", i + 1, entry.timestamp));
            out.push_str(&format!("👤 <b>From:</b> {}\n", escape_html(&entry.from)));
            out.push_str(&format!(
                "💬 <b>Message:</b> <code>{}</code>\n\n",
                escape_html(&preview(&entry.text))
            ));
        }
        out
    }
}

/// First 100 characters, with `...` when something was cut
fn preview(text: &str) -> String {
    if text.chars().count() > MESSAGE_PREVIEW_CHARS {
        let head: String = text.chars().take(MESSAGE_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::RecordingTransport;
    use crate::config::SourcesConfig;
    use crate::core::sender::ChannelSender;
    use crate::sources::DataSource;
    use std::time::Duration;

    const CHAT: i64 = 555;

    struct Harness {
        transport: Arc<RecordingTransport>,
        scheduler: Arc<AutoPushScheduler>,
        dispatcher: CommandDispatcher,
    }

    fn harness(admins: Vec<i64>) -> Harness {
        let transport = Arc::new(RecordingTransport::new());
        let sender = ChannelSender::new(
            transport.clone(),
            ChatId::parse("@alerts"),
            4096,
            Duration::from_millis(1),
        );
        let pipeline = Arc::new(PushPipeline::new(
            DataSource::new(SourcesConfig::default()),
            sender,
        ));
        let scheduler = Arc::new(AutoPushScheduler::new(
            pipeline.clone(),
            Duration::from_secs(3600),
            Duration::from_millis(50),
        ));
        let dispatcher =
            CommandDispatcher::new(transport.clone(), pipeline, scheduler.clone(), admins)
                .with_bot_username("notifier_bot");

        Harness {
            transport,
            scheduler,
            dispatcher,
        }
    }

    fn message(sender_id: i64, text: Option<&str>) -> InboundMessage {
        InboundMessage {
            message_id: 1,
            chat_id: CHAT,
            chat_kind: "private".to_string(),
            sender_id: Some(sender_id),
            sender_name: "Alice (@alice)".to_string(),
            text: text.map(str::to_string),
        }
    }

    fn replies(h: &Harness) -> Vec<String> {
        h.transport.sent_to(&ChatId::Id(CHAT))
    }

    #[test]
    fn test_classify_commands() {
        assert_eq!(
            Command::classify("/status", None),
            Classified::Command(Command::Status)
        );
        assert_eq!(
            Command::classify("/push@notifier_bot now", Some("notifier_bot")),
            Classified::Command(Command::Push)
        );
        assert_eq!(
            Command::classify("/push@other_bot", Some("notifier_bot")),
            Classified::Ignored
        );
        assert_eq!(Command::classify("/unknown", None), Classified::Ignored);
        assert_eq!(Command::classify("hello /status", None), Classified::Plain);
    }

    #[test]
    fn test_empty_allow_list_admits_everyone() {
        let h = harness(vec![]);
        assert!(h.dispatcher.is_authorized(Some(99)));
        assert!(h.dispatcher.is_authorized(None));
    }

    #[tokio::test]
    async fn test_unauthorized_stop_is_rejected() {
        let h = harness(vec![42]);
        h.scheduler.enable().await;

        h.dispatcher.handle(&message(99, Some("/stop"))).await;

        assert_eq!(replies(&h).last().map(String::as_str), Some(REJECTION_TEXT));
        assert!(h.scheduler.is_enabled());
        h.scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_unauthorized_push_sends_nothing_to_channel() {
        let h = harness(vec![42]);
        h.dispatcher.handle(&message(99, Some("/push"))).await;

        assert!(h.transport.sent_to(&ChatId::parse("@alerts")).is_empty());
        assert_eq!(replies(&h), vec![REJECTION_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn test_every_command_rejected_for_unlisted_caller() {
        let commands = [
            "/start",
            "/stop",
            "/status",
            "/push",
            "/autopush",
            "/messages",
            "/help",
        ];

        for enabled in [false, true] {
            let h = harness(vec![42]);
            if enabled {
                h.scheduler.enable().await;
                // Let the immediate first cycle land before counting channel posts
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            let channel_before = h.transport.sent_to(&ChatId::parse("@alerts")).len();

            for text in commands {
                h.dispatcher.handle(&message(99, Some(text))).await;
                assert_eq!(h.scheduler.is_enabled(), enabled, "{} changed push state", text);
            }

            assert_eq!(
                h.transport.sent_to(&ChatId::parse("@alerts")).len(),
                channel_before
            );
            assert_eq!(replies(&h), vec![REJECTION_TEXT.to_string(); commands.len()]);
            h.scheduler.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_replies_thread_under_triggering_message() {
        let h = harness(vec![]);
        let mut question = message(99, Some("any help here?"));
        question.message_id = 31;
        let mut status = message(1, Some("/status"));
        status.message_id = 32;

        h.dispatcher.handle(&question).await;
        h.dispatcher.handle(&status).await;

        assert_eq!(h.transport.reply_targets(&ChatId::Id(CHAT)), vec![31, 32]);
    }

    #[tokio::test]
    async fn test_authorized_stop_disables_push() {
        let h = harness(vec![42]);
        h.scheduler.enable().await;

        h.dispatcher.handle(&message(42, Some("/stop"))).await;

        assert!(!h.scheduler.is_enabled());
        assert!(replies(&h).contains(&STOPPED_TEXT.to_string()));
        h.scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_autopush_toggles() {
        let h = harness(vec![]);

        h.dispatcher.handle(&message(1, Some("/autopush"))).await;
        assert!(h.scheduler.is_enabled());
        h.dispatcher.handle(&message(1, Some("/autopush"))).await;
        assert!(!h.scheduler.is_enabled());

        let replies = replies(&h);
        assert!(replies.contains(&AUTOPUSH_ENABLED_TEXT.to_string()));
        assert!(replies.contains(&AUTOPUSH_DISABLED_TEXT.to_string()));
        h.scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_manual_push_reports_success() {
        let h = harness(vec![]);
        h.dispatcher.handle(&message(1, Some("/push"))).await;

        assert_eq!(
            replies(&h),
            vec![PUSH_ACK_TEXT.to_string(), PUSH_OK_TEXT.to_string()]
        );
        let channel = h.transport.sent_to(&ChatId::parse("@alerts"));
        assert_eq!(channel.len(), 1);
        assert!(channel[0].contains("Data Update Report"));
    }

    #[tokio::test]
    async fn test_manual_push_reports_failure() {
        let h = harness(vec![]);
        // Ack goes through, the channel push fails, the outcome reply goes through
        h.transport.fail_call(1);

        h.dispatcher.handle(&message(1, Some("/push"))).await;

        assert_eq!(
            replies(&h),
            vec![PUSH_ACK_TEXT.to_string(), PUSH_FAILED_TEXT.to_string()]
        );
    }

    #[tokio::test]
    async fn test_push_with_dead_transport_does_not_panic() {
        let h = harness(vec![]);
        h.transport.set_failing(true);
        h.dispatcher.handle(&message(1, Some("/push"))).await;
        assert_eq!(h.transport.attempts(), 3);
    }

    #[tokio::test]
    async fn test_messages_when_empty() {
        let h = harness(vec![]);
        h.dispatcher.handle(&message(1, Some("/messages"))).await;
        assert_eq!(replies(&h), vec![NO_MESSAGES_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn test_messages_lists_last_five_truncated() {
        let h = harness(vec![]);
        for i in 0..7 {
            h.dispatcher
                .handle(&message(1, Some(&format!("note {}", i))))
                .await;
        }
        let long = "x".repeat(150);
        h.dispatcher.handle(&message(1, Some(&long))).await;

        h.dispatcher.handle(&message(1, Some("/messages"))).await;

        let listing = replies(&h).pop().unwrap();
        assert!(listing.starts_with("📬 <b>Recent Received Messages:</b>"));
        assert!(!listing.contains("note 2"));
        assert!(listing.contains("<b>1.</b>"));
        assert!(listing.contains("note 3"));
        assert!(listing.contains("<b>5.</b>"));
        assert!(listing.find("note 3").unwrap() < listing.find("note 6").unwrap());
        assert!(listing.contains(&format!("{}...", "x".repeat(100))));
        assert!(!listing.contains(&"x".repeat(101)));
    }

    #[tokio::test]
    async fn test_plain_message_recorded_and_keyword_reply() {
        let h = harness(vec![42]);
        // History and auto-reply are not gated by the allow-list
        h.dispatcher.handle(&message(99, Some("Need HELP please"))).await;
        h.dispatcher.handle(&message(99, Some("good morning"))).await;

        assert_eq!(h.dispatcher.history_len(), 2);
        let replies = replies(&h);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Auto Reply"));
    }

    #[tokio::test]
    async fn test_auto_reply_failure_is_swallowed() {
        let h = harness(vec![]);
        h.transport.set_failing(true);
        h.dispatcher.handle(&message(1, Some("status?"))).await;
        assert_eq!(h.dispatcher.history_len(), 1);
        assert_eq!(h.transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_media_message_uses_placeholder() {
        let h = harness(vec![]);
        h.dispatcher.handle(&message(1, None)).await;

        let recent = h.dispatcher.recent_messages(5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "[Media/File]");
        assert!(replies(&h).is_empty());
    }

    #[tokio::test]
    async fn test_commands_and_unknown_commands_not_recorded() {
        let h = harness(vec![]);
        h.dispatcher.handle(&message(1, Some("/help"))).await;
        h.dispatcher.handle(&message(1, Some("/frobnicate"))).await;

        assert_eq!(h.dispatcher.history_len(), 0);
        assert_eq!(replies(&h).len(), 1);
    }

    #[tokio::test]
    async fn test_status_reports_state() {
        let h = harness(vec![]);
        h.dispatcher.handle(&message(1, Some("hello"))).await;
        h.dispatcher.handle(&message(1, Some("/status"))).await;

        let status = replies(&h).pop().unwrap();
        assert!(status.contains("<b>Auto Push:</b> <code>OFF</code>"));
        assert!(status.contains("<code>Sample Data</code>"));
        assert!(status.contains("<code>3600 seconds</code>"));
        assert!(status.contains("<b>Received Messages:</b> <code>1</code>"));
        assert!(status.contains("<code>@alerts</code>"));
    }

    #[tokio::test]
    async fn test_channel_post_recorded_without_reply() {
        let h = harness(vec![]);
        let post = InboundMessage {
            message_id: 9,
            chat_id: -100,
            chat_kind: "channel".to_string(),
            sender_id: None,
            sender_name: "Price Alerts".to_string(),
            text: Some("status update".to_string()),
        };
        h.dispatcher.handle(&post).await;

        assert_eq!(h.dispatcher.history_len(), 1);
        assert_eq!(h.transport.attempts(), 0);
    }
}

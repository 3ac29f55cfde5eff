//! Report rendering
//!
//! Pure functions turning payloads into HTML messages for the channel.
//! Transport limits are not considered here; see [`crate::core::chunker`].

use serde_json::Value;

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a payload into the data update report.
///
/// JSON payloads are re-indented inside a `language-json` block; anything
/// else is embedded as-is in a `<pre>` block.
pub fn render_report(payload: &str, source_label: &str, timestamp: &str) -> String {
    let content = match serde_json::from_str::<Value>(payload) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| payload.to_string());
            format!(
                "<pre><code class=\"language-json\">{}</code></pre>",
                escape_html(&pretty)
            )
        }
        Err(_) => format!("<pre>{}</pre>", escape_html(payload)),
    };

    format!(
        "📊 <b>Data Update Report</b>\n\
         ⏰ <b>Time:</b> <code>{}</code>\n\
         \n\
         📋 <b>Data Content:</b>\n\
         {}\n\
         \n\
         <i>Data Source: {}</i>",
        timestamp,
        content,
        escape_html(source_label)
    )
}

/// Announcement sent to the channel when the service comes up
pub fn render_startup(bot_username: &str, source_label: &str, timestamp: &str) -> String {
    format!(
        "🚀 <b>Interactive Bot Started</b>\n\
         ⏰ <b>Start Time:</b> <code>{}</code>\n\
         🤖 <b>Bot:</b> @{}\n\
         📡 <b>Data Source:</b> {}\n\
         \n\
         Bot is ready to receive commands and messages!\n\
         Use /help for available commands.",
        timestamp,
        escape_html(bot_username),
        escape_html(source_label)
    )
}

//! Splitting of over-length reports into transport-safe chunks
//!
//! Lengths are counted in characters, never bytes, so splits always land on
//! `char` boundaries. [`split_html`] additionally keeps every chunk valid for
//! Telegram's HTML parse mode.

use crate::config::constants::CHUNK_SAFETY_MARGIN;

/// Byte offset of the `n`-th character (or the end of `s`).
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Longest entity the Bot API accepts (`&#x1F600;`-style references included)
const MAX_ENTITY_LEN: usize = 10;

/// Pull a hard cut back so it does not land inside a tag or an `&...;` entity.
fn markup_safe_cut(head: &str) -> usize {
    let mut cut = head.len();
    if let Some(amp) = head.rfind('&') {
        if !head[amp..].contains(';') && head.len() - amp < MAX_ENTITY_LEN {
            cut = amp;
        }
    }
    if let Some(lt) = head[..cut].rfind('<') {
        if !head[lt..cut].contains('>') {
            cut = lt;
        }
    }
    if cut == 0 {
        head.len()
    } else {
        cut
    }
}

/// Split `text` into chunks of at most `limit` characters.
///
/// While the remainder is too long, cut at the last newline before
/// `limit - 100` characters (or hard at that point when there is none) and
/// strip the newlines the cut leaves at the start of the remainder. A hard
/// cut never splits a tag or an entity. Text that already fits comes back as
/// a single unmodified chunk.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let window = limit.saturating_sub(CHUNK_SAFETY_MARGIN).max(1);
    split_with_window(text, limit, window)
}

/// Cut while the remainder exceeds `limit`, each cut within `window` chars.
fn split_with_window(text: &str, limit: usize, window: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let window_end = byte_offset(rest, window);
        let split_at = match rest[..window_end].rfind('\n') {
            Some(newline) => newline,
            None => markup_safe_cut(&rest[..window_end]),
        };

        let (head, tail) = rest.split_at(split_at);
        // A newline at position 0 yields nothing worth sending
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail.trim_start_matches('\n');
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

/// Split an HTML message so that every chunk parses on its own.
///
/// Tags still open at the end of a chunk are closed there and reopened, with
/// their original attributes, at the start of the next chunk. The reopened
/// markup is paid for by the safety margin, so the tail chunk is cut against
/// `limit - 100` as well.
pub fn split_html(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = split_message(text, limit);
    if chunks.len() > 1 {
        if let Some(tail) = chunks.pop() {
            let window = limit.saturating_sub(CHUNK_SAFETY_MARGIN).max(1);
            chunks.extend(split_with_window(&tail, window, window));
        }
    }
    balance_markup(chunks)
}

/// Close tags left open by each chunk and reopen them in the next one.
pub fn balance_markup(chunks: Vec<String>) -> Vec<String> {
    // (tag name, full opening tag)
    let mut open: Vec<(String, String)> = Vec::new();

    chunks
        .into_iter()
        .map(|chunk| {
            let mut out: String = open.iter().map(|(_, tag)| tag.as_str()).collect();
            out.push_str(&chunk);
            track_tags(&chunk, &mut open);
            for (name, _) in open.iter().rev() {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            out
        })
        .collect()
}

fn track_tags(text: &str, open: &mut Vec<(String, String)>) {
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start..=start + len];
        let inner = &tag[1..tag.len() - 1];

        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim();
            if let Some(pos) = open.iter().rposition(|(n, _)| n == name) {
                open.truncate(pos);
            }
        } else if let Some(name) = inner.split_whitespace().next() {
            open.push((name.to_string(), tag.to_string()));
        }

        rest = &rest[start + len + 1..];
    }
}

//! Text chunking for Telegram's message size limit
//!
//! Telegram rejects messages over 4096 characters. Long solutions are split on
//! paragraph boundaries where possible, then on line breaks, then hard.

/// Chunk size limit (leaves margin from Telegram's 4096 hard cap)
pub const DEFAULT_LIMIT: usize = 4000;

/// Split `text` into chunks of at most `limit` characters
///
/// Every returned chunk is non-empty; empty input yields no chunks.
#[must_use]
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);

    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split_inclusive("\n\n") {
        if char_len(&current) + char_len(paragraph) <= limit {
            current.push_str(paragraph);
            continue;
        }

        flush(&mut current, &mut chunks);

        if char_len(paragraph) <= limit {
            current.push_str(paragraph);
        } else {
            chunks.extend(split_oversized(paragraph, limit));
        }
    }
    flush(&mut current, &mut chunks);

    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    let trimmed = current.trim_end();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Split a single oversized paragraph, preferring the last newline before the limit
fn split_oversized(paragraph: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = paragraph;

    while char_len(rest) > limit {
        // Byte offset of the character just past the limit
        let cut = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);

        let split_at = rest[..cut]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map_or(cut, |i| i + 1);

        let (head, tail) = rest.split_at(split_at);
        let head = head.trim_end();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail;
    }

    let tail = rest.trim_end();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }

    chunks
}

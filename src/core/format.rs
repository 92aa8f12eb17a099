//! Text helpers for outbound messages
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Russian remaining-time rendering for the reminder list
//! - 1.0.0: Message chunking for the 2000 character Discord limit

use chrono::NaiveDateTime;
use std::time::Duration;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Chunk text into pieces of at most `max_size` bytes (UTF-8 safe, line-aware)
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let line_len = line.len() + 1;
        if current.len() + line_len > max_size {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            if line_len > max_size {
                chunks.extend(split_long_line(line, max_size));
                continue;
            }
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn split_long_line(line: &str, max_size: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Chunk text for message content
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}

/// Short day.month hour:minute stamp used in confirmations and lists
pub fn format_fire_at(at: &NaiveDateTime) -> String {
    at.format("%d.%m %H:%M").to_string()
}

/// Render a remaining duration as e.g. "1 ч 5 мин" or "40 сек"
pub fn format_remaining(remaining: Duration) -> String {
    let seconds = remaining.as_secs();
    if seconds == 0 {
        return "сейчас".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} д"));
    }
    if hours > 0 {
        parts.push(format!("{hours} ч"));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!("{minutes} мин"));
    }
    if secs > 0 && days == 0 && hours == 0 {
        parts.push(format!("{secs} сек"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_short_text_no_chunk() {
        assert_eq!(chunk_text("hello", 100), vec!["hello"]);
    }

    #[test]
    fn test_chunk_respects_lines() {
        let result = chunk_text("line1\nline2\nline3", 12);
        assert_eq!(result, vec!["line1\nline2", "line3"]);
    }

    #[test]
    fn test_chunk_handles_long_lines() {
        let result = chunk_text(&"a".repeat(100), 30);
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|chunk| chunk.len() <= 30));
    }

    #[test]
    fn test_chunk_utf8_safety() {
        let text = "напоминание ".repeat(400);
        for chunk in chunk_for_message(&text) {
            assert!(chunk.len() <= MESSAGE_LIMIT);
        }
    }

    #[test]
    fn test_format_fire_at() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(format_fire_at(&at), "02.03 09:05");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::ZERO), "сейчас");
        assert_eq!(format_remaining(Duration::from_secs(40)), "40 сек");
        assert_eq!(format_remaining(Duration::from_secs(125)), "2 мин 5 сек");
        assert_eq!(format_remaining(Duration::from_secs(3_900)), "1 ч 5 мин");
        assert_eq!(format_remaining(Duration::from_secs(90_000)), "1 д 1 ч");
    }
}

//! Task extraction from free-form model output.
//!
//! Numbered (`1. Step`) and bulleted (`- Step`, `* Step`, `• Step`) lines
//! contribute their text; other substantial lines are kept verbatim unless
//! they open with a filler word. If nothing qualifies, every non-blank line
//! is returned as-is, so prose-only input still yields a (prose) task list.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*(.+)$").unwrap());

static BULLETED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•*]\s*(.+)$").unwrap());

/// Lines opening with these are treated as narration, not steps.
const FILLER_PREFIXES: [&str; 4] = ["The", "This", "Here", "Below"];

/// Unmatched lines must be longer than this (in characters) to count.
const MIN_FREEFORM_LEN: usize = 10;

/// Extract an ordered task list from text.
pub fn extract_tasks(text: &str) -> Vec<String> {
    let mut tasks = Vec::new();

    for line in text.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(item) = list_item(line) {
            tasks.push(item.to_string());
            continue;
        }

        if line.chars().count() > MIN_FREEFORM_LEN
            && !FILLER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        {
            tasks.push(line.to_string());
        }
    }

    if tasks.is_empty() {
        tracing::debug!("No list items found, falling back to raw lines");
        return text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect();
    }

    tasks
}

/// Text of a numbered or bulleted list line, marker stripped.
fn list_item(line: &str) -> Option<&str> {
    NUMBERED_ITEM
        .captures(line)
        .or_else(|| BULLETED_ITEM.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

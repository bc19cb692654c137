//! Utility functions and helpers

use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use std::path::PathBuf;

/// Fallback display format for session dates (en-US style `M/D/YYYY`)
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Mint a new message or session id.
///
/// UUIDv7 ids are time-ordered and monotonic within the process, so ids
/// created in the same millisecond still differ and still sort by creation.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Keep the first `max_chars` characters of `s`, appending "..." when cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}

/// Whether `format` parses as a strftime format string
pub fn is_valid_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Format the current local date for display.
///
/// A format chrono cannot render falls back to [`DEFAULT_DATE_FORMAT`].
pub fn display_date(format: &str) -> String {
    let now = chrono::Local::now();
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_ok() {
        return out;
    }
    now.format(DEFAULT_DATE_FORMAT).to_string()
}

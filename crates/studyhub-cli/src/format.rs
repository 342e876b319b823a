//! Display helpers for terminal output.

use chrono::{DateTime, Utc};
use studyhub_core::models::exam::parse_due_date;

/// Truncate a string to a maximum number of characters, adding an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// `dd/mm/yyyy` for whatever date format the service sent; unparseable
/// input is shown as-is, nothing as `-`.
pub fn format_date(date: Option<&str>) -> String {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_due_date(raw)
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => "-".to_string(),
    }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Human-readable size with one decimal above bytes.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// `[x]` / `[ ]` checkbox.
pub fn check(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

//! Common display utilities and helpers

use chrono::{DateTime, Utc};

/// Placeholder for absent values
pub const DASH: &str = "--";

/// Truncate string to max length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// The value, or `--` when absent or empty
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => DASH.to_string(),
    }
}

/// Checkmark for true, empty otherwise
pub fn check(flag: bool) -> String {
    if flag {
        "\u{2713}".to_string() // checkmark
    } else {
        String::new()
    }
}

/// Format timestamp string to ISO datetime (YYYY-MM-DDTHH:MM:SSZ)
pub fn format_as_iso_datetime(timestamp: &str) -> String {
    if let Ok(dt) = timestamp.parse::<DateTime<Utc>>() {
        return dt.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    }

    // Unix timestamp in milliseconds
    if let Ok(ts_ms) = timestamp.parse::<i64>()
        && let Some(dt) = DateTime::from_timestamp_millis(ts_ms)
    {
        return dt.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    }

    // Return as-is if we can't parse it
    timestamp.to_string()
}

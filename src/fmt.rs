//! Shared formatting helpers for the renderers.
//!
//! All pure formatting functions (no I/O, no layout decisions) live here.

use chrono::{DateTime, Local, Utc};

/// Horizontal alignment of a fixed-width cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Cell padding
// ---------------------------------------------------------------------------

/// Pads `s` to `width` characters. Longer strings are returned unchanged.
pub fn pad(s: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{:<width$}", s, width = width),
        Align::Right => format!("{:>width$}", s, width = width),
    }
}

/// Truncates `s` to at most `max_chars` characters (no ellipsis).
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Bytes to whole KiB (truncating).
pub fn kib(bytes: u64) -> u64 {
    bytes / 1024
}

/// Percentage with one decimal: `"12.5"`.
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}", pct)
}

/// Summary date as `mm/dd/yy HH:MM:SS` in local time.
pub fn format_tick_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m/%d/%y %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Delimited output
// ---------------------------------------------------------------------------

/// Quotes a delimited value when it contains the delimiter, a quote or a
/// line break. Embedded quotes are doubled.
pub fn quote_delimited(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

//! Race time and timestamp formatting.

use chrono::DateTime;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

/// Format a race time in milliseconds.
///
/// Negative values (including the `0xFFFFFFFF` "no time" marker read as a
/// signed value) render as `-:--.---`.
pub fn format_time(ms: i32) -> String {
    if ms < 0 {
        return "-:--.---".to_string();
    }
    let millis = ms % 1000;
    let total_seconds = ms / 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes}:{seconds:02}.{millis:03}")
    }
}

/// Convert a Windows FILETIME (100 ns ticks since 1601) to Unix seconds.
pub fn filetime_to_unix(filetime: u64) -> i64 {
    (filetime / FILETIME_TICKS_PER_SECOND) as i64 - FILETIME_UNIX_OFFSET
}

/// Format Unix seconds as `YYYY-MM-DD hh:mm:ss` (UTC).
///
/// Returns `None` for timestamps outside chrono's supported range.
pub fn format_unix(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0)
        .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Local `HH:MM:SS` rendering of an epoch-millisecond instant, `-` when out of range.
pub fn clock_label(ts_ms: u64) -> String {
    i64::try_from(ts_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

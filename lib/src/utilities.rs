use chrono::{DateTime, Duration, Utc};

pub const POLL_WINDOW_DAYS: i64 = 30;


// unix seconds, POLL_WINDOW_DAYS before `now`
pub fn poll_window_start(now: DateTime<Utc>) -> i64 {
    (now - Duration::days(POLL_WINDOW_DAYS)).timestamp()
}

// 2024-10-13 09:00:00 UTC
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(date_time) => date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => timestamp.to_string(),
    }
}

//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current epoch time in milliseconds (database timestamp format)
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current server-local wall clock, used for publish scheduling
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Today's date as `YYYY-MM-DD` in server-local time
pub fn today_string() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Current time of day as `HH:MM` in server-local time
pub fn time_string() -> String {
    Local::now().format("%H:%M").to_string()
}

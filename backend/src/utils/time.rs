//! Time helpers
//!
//! All timestamps are stored as `i64` Unix millis (UTC). Handlers and
//! domain code go through these helpers instead of calling chrono directly.

use chrono::Utc;

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whole days elapsed between `since` and `now` (negative deltas count as 0)
pub fn days_since(since: i64, now: i64) -> i64 {
    (now - since).max(0) / DAY_MILLIS
}

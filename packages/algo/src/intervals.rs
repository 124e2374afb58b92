//! Review Interval Tables
//!
//! Two tables exist for the same concept and are deliberately kept apart:
//!
//! - [`REVIEW_DELAY_SECONDS`] is authoritative. `next_review` on a record is
//!   always `last_reviewed + review_delay(level)`.
//! - [`ESTIMATE_INTERVAL_DAYS`] is a coarse day-scale estimate used only for
//!   urgency ranking and "days until next interval" hints in the UI. It never
//!   decides whether a word is due.

use chrono::Duration;

use crate::types::MasteryLevel;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Delay until the next review, indexed by the post-attempt mastery level
pub const REVIEW_DELAY_SECONDS: [i64; 6] = [
    MINUTE,      // 0: 1 min
    10 * MINUTE, // 1: 10 min
    HOUR,        // 2: 1 hour
    12 * HOUR,   // 3: 12 hours
    DAY,         // 4: 1 day
    7 * DAY,     // 5: 7 days
];

/// Day-scale estimate table, indexed by level and clamped to the last entry
pub const ESTIMATE_INTERVAL_DAYS: [u32; 8] = [1, 2, 4, 7, 15, 30, 60, 120];

/// Authoritative review delay for a mastery level
pub fn review_delay(level: MasteryLevel) -> Duration {
    Duration::seconds(REVIEW_DELAY_SECONDS[level.index()])
}

/// Day-scale estimate for a level index; indices past the table use the last entry
pub fn estimate_interval_days(level: usize) -> u32 {
    let idx = level.min(ESTIMATE_INTERVAL_DAYS.len() - 1);
    ESTIMATE_INTERVAL_DAYS[idx]
}

/// Human readable interval, rounded to the largest fitting unit
pub fn format_interval(delay: Duration) -> String {
    let seconds = delay.num_seconds().max(0) as f64;
    if seconds < HOUR as f64 {
        let minutes = (seconds / MINUTE as f64).round() as i64;
        return format!("{minutes} 分钟");
    }
    if seconds < DAY as f64 {
        let hours = (seconds / HOUR as f64).round() as i64;
        return format!("{hours} 小时");
    }
    let days = (seconds / DAY as f64).round() as i64;
    format!("{days} 天")
}

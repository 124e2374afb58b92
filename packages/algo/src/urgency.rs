//! Urgency Ranking
//!
//! Display-only ordering signal:
//! `urgency = days_since_review / estimate_interval_days(level)`.
//!
//! It uses the day-scale estimate table and is independent of
//! [`crate::scheduler::is_due`]; a word can rank high here and still not be due.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::intervals::estimate_interval_days;
use crate::types::{MasteryRecord, UrgencyEntry, SECONDS_PER_DAY};

/// Days elapsed since the last review, never negative
pub fn days_since_review(record: &MasteryRecord, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - record.last_reviewed).num_seconds().max(0);
    elapsed as f64 / SECONDS_PER_DAY
}

/// Estimated days until the word's next interval, for UI hints
pub fn estimated_next_interval_days(record: &MasteryRecord) -> u32 {
    estimate_interval_days(record.mastery_level.index())
}

pub fn urgency(record: &MasteryRecord, now: DateTime<Utc>) -> f64 {
    days_since_review(record, now) / estimated_next_interval_days(record) as f64
}

/// Rank records by urgency, highest first (ties by `word_id`), truncated to `limit`
pub fn rank_by_urgency<'a, I>(records: I, now: DateTime<Utc>, limit: usize) -> Vec<UrgencyEntry>
where
    I: IntoIterator<Item = &'a MasteryRecord>,
{
    let mut entries: Vec<UrgencyEntry> = records
        .into_iter()
        .map(|record| UrgencyEntry {
            word_id: record.word_id.clone(),
            mastery_level: record.mastery_level,
            urgency: urgency(record, now),
            days_since_review: days_since_review(record, now),
            expected_interval_days: estimated_next_interval_days(record),
            is_due: record.is_due(now),
        })
        .collect();

    entries.sort_by(|a, b| match b.urgency.total_cmp(&a.urgency) {
        Ordering::Equal => a.word_id.cmp(&b.word_id),
        other => other,
    });
    entries.truncate(limit);
    entries
}

//! Mastery Scheduler
//!
//! Pure state transitions over [`MasteryRecord`]s:
//!
//! - correct attempt: `level' = min(5, level + 1)`
//! - incorrect attempt: `level' = max(0, level - 1)`
//! - `next_review = now + review_delay(level')`
//!
//! Nothing here touches storage or the clock; callers pass `now` and persist
//! the returned record themselves.

use chrono::{DateTime, Utc};

use crate::intervals::review_delay;
use crate::types::{MasteryLevel, MasteryRecord};

/// Apply one attempt to a word.
///
/// `previous` is the stored record, or `None` if the word has never been
/// attempted; a fresh record at level 0 with zero counts is synthesized in
/// that case before the transition. `word_id` is only consulted for a fresh
/// record.
pub fn record_attempt(
    previous: Option<&MasteryRecord>,
    word_id: &str,
    is_correct: bool,
    now: DateTime<Utc>,
) -> MasteryRecord {
    let (word_id, level, correct_count, incorrect_count) = match previous {
        Some(record) => {
            debug_assert_eq!(record.word_id, word_id, "attempt applied to wrong record");
            (
                record.word_id.clone(),
                record.mastery_level,
                record.correct_count,
                record.incorrect_count,
            )
        }
        None => (word_id.to_string(), MasteryLevel::NEW, 0, 0),
    };

    let next_level = level.after(is_correct);
    let (correct_count, incorrect_count) = if is_correct {
        (correct_count.saturating_add(1), incorrect_count)
    } else {
        (correct_count, incorrect_count.saturating_add(1))
    };

    MasteryRecord {
        word_id,
        mastery_level: next_level,
        correct_count,
        incorrect_count,
        last_reviewed: now,
        next_review: now + review_delay(next_level),
    }
}

impl MasteryRecord {
    /// Record for a word's very first attempt
    pub fn first_attempt(word_id: &str, is_correct: bool, now: DateTime<Utc>) -> Self {
        record_attempt(None, word_id, is_correct, now)
    }

    /// New record after another attempt on this word
    pub fn apply_attempt(&self, is_correct: bool, now: DateTime<Utc>) -> Self {
        record_attempt(Some(self), &self.word_id, is_correct, now)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        is_due(self, now)
    }
}

/// `true` once `now` has reached the scheduled review time (inclusive)
pub fn is_due(record: &MasteryRecord, now: DateTime<Utc>) -> bool {
    now >= record.next_review
}

/// Due check for a possibly absent record; a word with no record is never due
pub fn is_due_opt(record: Option<&MasteryRecord>, now: DateTime<Utc>) -> bool {
    record.is_some_and(|r| is_due(r, now))
}

/// Due records, most overdue first.
///
/// Cloning the iterator restarts it from the beginning; it borrows the
/// records and never modifies them.
#[derive(Clone, Debug)]
pub struct DueWords<'a> {
    inner: std::iter::Take<std::vec::IntoIter<&'a MasteryRecord>>,
}

impl<'a> Iterator for DueWords<'a> {
    type Item = &'a MasteryRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DueWords<'_> {}

/// Select the records due at `now`, ordered by ascending `next_review`
/// (ties by `word_id`), truncated to `limit`.
///
/// See [`crate::types::DEFAULT_DUE_LIMIT`] for the conventional limit.
pub fn select_due_words<'a, I>(records: I, now: DateTime<Utc>, limit: usize) -> DueWords<'a>
where
    I: IntoIterator<Item = &'a MasteryRecord>,
{
    let mut due: Vec<&'a MasteryRecord> = records.into_iter().filter(|r| is_due(r, now)).collect();
    due.sort_by(|a, b| {
        a.next_review
            .cmp(&b.next_review)
            .then_with(|| a.word_id.cmp(&b.word_id))
    });

    DueWords {
        inner: due.into_iter().take(limit),
    }
}

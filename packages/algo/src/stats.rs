//! Aggregate mastery statistics over a user's records.

use chrono::{DateTime, Utc};

use crate::types::{MasteryRecord, MasteryStats};

pub fn summarize<'a, I>(records: I, now: DateTime<Utc>) -> MasteryStats
where
    I: IntoIterator<Item = &'a MasteryRecord>,
{
    let mut stats = MasteryStats::default();
    let mut correct: u64 = 0;
    let mut attempts: u64 = 0;

    for record in records {
        stats.total_words += 1;
        stats.level_distribution[record.mastery_level.index()] += 1;

        match record.mastery_level.get() {
            0 => stats.struggling_words += 1,
            5 => stats.mastered_words += 1,
            _ => stats.learning_words += 1,
        }

        correct += record.correct_count as u64;
        attempts += record.total_attempts();

        if record.is_due(now) {
            stats.due_count += 1;
        } else {
            stats.next_upcoming_review = Some(match stats.next_upcoming_review {
                Some(current) => current.min(record.next_review),
                None => record.next_review,
            });
        }
    }

    stats.accuracy = if attempts == 0 {
        0.0
    } else {
        correct as f64 / attempts as f64
    };
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::review_delay;
    use crate::types::MasteryLevel;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-02-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(word_id: &str, level: i64, correct: u32, incorrect: u32, hours_ago: i64) -> MasteryRecord {
        let level = MasteryLevel::new(level);
        let last = now() - Duration::hours(hours_ago);
        MasteryRecord {
            word_id: word_id.to_string(),
            mastery_level: level,
            correct_count: correct,
            incorrect_count: incorrect,
            last_reviewed: last,
            next_review: last + review_delay(level),
        }
    }

    #[test]
    fn test_summarize_empty() {
        let records: Vec<MasteryRecord> = Vec::new();
        let stats = summarize(&records, now());
        assert_eq!(stats, MasteryStats::default());
        assert_eq!(stats.accuracy, 0.0);
        assert!(stats.next_upcoming_review.is_none());
    }

    #[test]
    fn test_summarize_buckets_and_due() {
        let records = vec![
            record("a", 0, 0, 2, 1), // due (1 min)
            record("b", 2, 2, 0, 2), // due (1 hour)
            record("c", 3, 3, 0, 1), // next in 11h
            record("d", 5, 6, 2, 0), // next in 7d
        ];
        let stats = summarize(&records, now());
        assert_eq!(stats.total_words, 4);
        assert_eq!(stats.struggling_words, 1);
        assert_eq!(stats.learning_words, 2);
        assert_eq!(stats.mastered_words, 1);
        assert_eq!(stats.due_count, 2);
        assert_eq!(stats.level_distribution, [1, 0, 1, 1, 0, 1]);
        assert!((stats.accuracy - 11.0 / 15.0).abs() < 1e-12);
        assert_eq!(stats.next_upcoming_review, Some(now() + Duration::hours(11)));
    }

    #[test]
    fn test_summarize_all_due_has_no_upcoming() {
        let records = vec![record("a", 1, 1, 0, 5), record("b", 0, 0, 1, 5)];
        let stats = summarize(&records, now());
        assert_eq!(stats.due_count, 2);
        assert!(stats.next_upcoming_review.is_none());
    }
}

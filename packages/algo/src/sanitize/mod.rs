//! Data Sanitization
//!
//! Conversion between the stored record shape and [`MasteryRecord`].
//!
//! Functions:
//! - Level / count clamping
//! - Persisted record repair
//! - Record health diagnostics
//!
//! Corrupted values degrade to the nearest edge of their range instead of
//! failing a learning session. Only timestamps that cannot be parsed at all
//! are rejected.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::intervals::review_delay;
use crate::types::{
    MasteryLevel, MasteryRecord, PersistedMasteryRecord, RecordDiagnostic, MAX_MASTERY_LEVEL,
    MIN_MASTERY_LEVEL,
};

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("record has an empty wordId")]
    EmptyWordId,
    #[error("invalid {field} timestamp for word {word_id}: {value:?}")]
    InvalidTimestamp {
        word_id: String,
        field: &'static str,
        value: String,
    },
}

/// 将任意整数限制到 [0, 5]
pub fn clamp_level(raw: i64) -> MasteryLevel {
    MasteryLevel::new(raw)
}

/// 计数不能为负，也不能超出 u32
pub fn clamp_count(raw: i64) -> u32 {
    raw.clamp(0, u32::MAX as i64) as u32
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 修复持久化记录
///
/// - level 超界 → 截断到 [0, 5]
/// - 负计数 → 0
/// - next_review 与 last_reviewed + 间隔(level) 不一致 → 按截断后的 level 重新计算
pub fn sanitize_record(persisted: &PersistedMasteryRecord) -> Result<MasteryRecord, SanitizeError> {
    let word_id = persisted.word_id.trim();
    if word_id.is_empty() {
        return Err(SanitizeError::EmptyWordId);
    }

    let last_reviewed = parse_field(word_id, "lastReviewed", &persisted.last_reviewed)?;
    let next_review = parse_field(word_id, "nextReview", &persisted.next_review)?;

    let mastery_level = clamp_level(persisted.mastery_level);
    if mastery_level.get() as i64 != persisted.mastery_level {
        tracing::warn!(
            word_id,
            raw = persisted.mastery_level,
            clamped = mastery_level.get(),
            "mastery level out of range, clamped"
        );
    }

    let correct_count = clamp_count(persisted.correct_count);
    let incorrect_count = clamp_count(persisted.incorrect_count);
    if persisted.correct_count < 0 || persisted.incorrect_count < 0 {
        tracing::warn!(
            word_id,
            correct = persisted.correct_count,
            incorrect = persisted.incorrect_count,
            "negative attempt counts, clamped to zero"
        );
    }

    let expected = last_reviewed + review_delay(mastery_level);
    if next_review != expected {
        tracing::warn!(
            word_id,
            next_review = %next_review,
            repaired = %expected,
            "nextReview does not match level interval, recomputed"
        );
    }

    Ok(MasteryRecord {
        word_id: word_id.to_string(),
        mastery_level,
        correct_count,
        incorrect_count,
        last_reviewed,
        next_review: expected,
    })
}

fn parse_field(
    word_id: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, SanitizeError> {
    parse_timestamp(value).ok_or_else(|| SanitizeError::InvalidTimestamp {
        word_id: word_id.to_string(),
        field,
        value: value.to_string(),
    })
}

impl From<&MasteryRecord> for PersistedMasteryRecord {
    fn from(record: &MasteryRecord) -> Self {
        Self {
            word_id: record.word_id.clone(),
            mastery_level: record.mastery_level.get() as i64,
            correct_count: record.correct_count as i64,
            incorrect_count: record.incorrect_count as i64,
            last_reviewed: format_timestamp(record.last_reviewed),
            next_review: format_timestamp(record.next_review),
        }
    }
}

impl MasteryRecord {
    pub fn to_persisted(&self) -> PersistedMasteryRecord {
        PersistedMasteryRecord::from(self)
    }
}

impl TryFrom<&PersistedMasteryRecord> for MasteryRecord {
    type Error = SanitizeError;

    fn try_from(persisted: &PersistedMasteryRecord) -> Result<Self, Self::Error> {
        sanitize_record(persisted)
    }
}

/// 诊断持久化记录的健康状态
pub fn diagnose_record(persisted: &PersistedMasteryRecord) -> RecordDiagnostic {
    let level_out_of_range = persisted.mastery_level < MIN_MASTERY_LEVEL as i64
        || persisted.mastery_level > MAX_MASTERY_LEVEL as i64;
    let negative_counts = persisted.correct_count < 0 || persisted.incorrect_count < 0;

    let last = parse_timestamp(&persisted.last_reviewed);
    let next = parse_timestamp(&persisted.next_review);
    let invalid_timestamps = last.is_none() || next.is_none();
    // 调度只由 (截断后的) level 决定
    let schedule_inconsistent = match (last, next) {
        (Some(last), Some(next)) => {
            next != last + review_delay(clamp_level(persisted.mastery_level))
        }
        _ => false,
    };

    let is_healthy =
        !level_out_of_range && !negative_counts && !invalid_timestamps && !schedule_inconsistent;

    let message = if is_healthy {
        "Record is healthy".to_string()
    } else if invalid_timestamps {
        "Record has unparseable timestamps".to_string()
    } else if level_out_of_range {
        format!(
            "Mastery level {} outside [{}, {}]",
            persisted.mastery_level, MIN_MASTERY_LEVEL, MAX_MASTERY_LEVEL
        )
    } else if negative_counts {
        "Record has negative attempt counts".to_string()
    } else {
        "nextReview does not match the level interval".to_string()
    };

    RecordDiagnostic {
        is_healthy,
        level_out_of_range,
        negative_counts,
        invalid_timestamps,
        schedule_inconsistent,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn persisted(level: i64, correct: i64, incorrect: i64, last: &str, next: &str) -> PersistedMasteryRecord {
        PersistedMasteryRecord {
            word_id: "w1".to_string(),
            mastery_level: level,
            correct_count: correct,
            incorrect_count: incorrect,
            last_reviewed: last.to_string(),
            next_review: next.to_string(),
        }
    }

    const LAST: &str = "2024-01-01T10:00:00.000Z";
    const NEXT: &str = "2024-01-01T11:00:00.000Z";

    // ==================== clamp 测试 ====================

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-5), 0);
        assert_eq!(clamp_count(0), 0);
        assert_eq!(clamp_count(42), 42);
        assert_eq!(clamp_count(i64::MAX), u32::MAX);
    }

    #[test]
    fn test_clamp_level() {
        assert_eq!(clamp_level(-1).get(), 0);
        assert_eq!(clamp_level(6).get(), 5);
        assert_eq!(clamp_level(2).get(), 2);
    }

    // ==================== sanitize_record 测试 ====================

    #[test]
    fn test_sanitize_valid_record_unchanged() {
        let p = persisted(2, 3, 1, LAST, NEXT);
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.mastery_level.get(), 2);
        assert_eq!(r.correct_count, 3);
        assert_eq!(r.incorrect_count, 1);
        assert_eq!(r.next_review - r.last_reviewed, Duration::hours(1));
        assert_eq!(r.to_persisted(), p);
    }

    #[test]
    fn test_sanitize_clamps_level_and_counts() {
        let p = persisted(17, -2, -9, LAST, NEXT);
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.mastery_level.get(), 5);
        assert_eq!(r.correct_count, 0);
        assert_eq!(r.incorrect_count, 0);
    }

    #[test]
    fn test_sanitize_repairs_inverted_schedule() {
        let p = persisted(3, 1, 0, NEXT, LAST);
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.next_review - r.last_reviewed, Duration::hours(12));
    }

    #[test]
    fn test_sanitize_repairs_equal_schedule() {
        let p = persisted(-4, 0, 1, LAST, LAST);
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.mastery_level.get(), 0);
        assert_eq!(r.next_review - r.last_reviewed, Duration::minutes(1));
    }

    #[test]
    fn test_sanitize_recomputes_far_future_schedule() {
        // level 0 scheduled a year out: must be due again after one minute
        let p = persisted(0, 0, 3, "2024-01-01T00:00:00.000Z", "2025-01-01T00:00:00.000Z");
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.next_review - r.last_reviewed, Duration::minutes(1));
        assert_eq!(r.to_persisted().next_review, "2024-01-01T00:01:00.000Z");
    }

    #[test]
    fn test_sanitize_clamped_level_drives_schedule() {
        let p = persisted(9, 4, 0, LAST, NEXT);
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.mastery_level.get(), 5);
        assert_eq!(r.next_review - r.last_reviewed, Duration::days(7));
    }

    #[test]
    fn test_sanitize_accepts_offsets() {
        let p = persisted(1, 1, 0, "2024-01-01T18:00:00+08:00", "2024-01-01T10:10:00Z");
        let r = sanitize_record(&p).unwrap();
        assert_eq!(r.next_review - r.last_reviewed, Duration::minutes(10));
    }

    #[test]
    fn test_sanitize_rejects_bad_timestamp() {
        let p = persisted(1, 1, 0, "yesterday", NEXT);
        let err = sanitize_record(&p).unwrap_err();
        assert!(matches!(
            err,
            SanitizeError::InvalidTimestamp { field: "lastReviewed", .. }
        ));
    }

    #[test]
    fn test_sanitize_rejects_empty_word_id() {
        let mut p = persisted(1, 1, 0, LAST, NEXT);
        p.word_id = "  ".to_string();
        assert!(matches!(sanitize_record(&p), Err(SanitizeError::EmptyWordId)));
    }

    #[test]
    fn test_persisted_wire_shape() {
        let json = serde_json::to_value(persisted(1, 2, 3, LAST, NEXT)).unwrap();
        assert_eq!(json["wordId"], "w1");
        assert_eq!(json["masteryLevel"], 1);
        assert_eq!(json["correctCount"], 2);
        assert_eq!(json["incorrectCount"], 3);
        assert_eq!(json["lastReviewed"], LAST);
        assert_eq!(json["nextReview"], NEXT);
    }

    // ==================== diagnose_record 测试 ====================

    #[test]
    fn test_diagnose_healthy() {
        let d = diagnose_record(&persisted(2, 1, 1, LAST, NEXT));
        assert!(d.is_healthy);
        assert_eq!(d.message, "Record is healthy");
    }

    #[test]
    fn test_diagnose_level_out_of_range() {
        let d = diagnose_record(&persisted(8, 1, 1, LAST, NEXT));
        assert!(!d.is_healthy);
        assert!(d.level_out_of_range);
        assert!(d.message.contains("outside"));
    }

    #[test]
    fn test_diagnose_negative_counts() {
        let d = diagnose_record(&persisted(2, -1, 0, LAST, NEXT));
        assert!(!d.is_healthy);
        assert!(d.negative_counts);
        assert_eq!(d.message, "Record has negative attempt counts");
    }

    #[test]
    fn test_diagnose_inconsistent_schedule() {
        let d = diagnose_record(&persisted(2, 1, 0, NEXT, LAST));
        assert!(d.schedule_inconsistent);
        assert!(!d.invalid_timestamps);
    }

    #[test]
    fn test_diagnose_schedule_not_matching_level() {
        let d = diagnose_record(&persisted(
            0,
            0,
            3,
            "2024-01-01T00:00:00.000Z",
            "2025-01-01T00:00:00.000Z",
        ));
        assert!(!d.is_healthy);
        assert!(d.schedule_inconsistent);
        assert!(!d.level_out_of_range);
        assert_eq!(d.message, "nextReview does not match the level interval");
    }

    #[test]
    fn test_diagnose_out_of_range_level_checks_clamped_interval() {
        // level 9 clamps to 5 (7 days); a 1 hour gap is inconsistent
        let d = diagnose_record(&persisted(9, 1, 1, LAST, NEXT));
        assert!(d.level_out_of_range);
        assert!(d.schedule_inconsistent);
    }

    #[test]
    fn test_diagnose_invalid_timestamps() {
        let d = diagnose_record(&persisted(2, 1, 0, LAST, ""));
        assert!(d.invalid_timestamps);
        assert!(!d.schedule_inconsistent);
        assert_eq!(d.message, "Record has unparseable timestamps");
    }
}

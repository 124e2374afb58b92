//! Common Types and Constants
//!
//! Shared data structures used across the scheduling modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest mastery level (never answered correctly)
pub const MIN_MASTERY_LEVEL: u8 = 0;

/// Highest mastery level (fully retained)
pub const MAX_MASTERY_LEVEL: u8 = 5;

/// Number of distinct mastery levels
pub const MASTERY_LEVEL_COUNT: usize = MAX_MASTERY_LEVEL as usize + 1;

/// Default truncation for due-word selection
pub const DEFAULT_DUE_LIMIT: usize = 20;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ==================== Mastery Level ====================

/// Mastery level in `[0, 5]`.
///
/// Construction always clamps, so an out-of-range value can never be observed.
/// Serialized as a bare integer; deserializing a value outside the range clamps it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    /// Level of a word that has not been answered correctly yet
    pub const NEW: Self = Self(MIN_MASTERY_LEVEL);

    /// Fully retained
    pub const MAX: Self = Self(MAX_MASTERY_LEVEL);

    /// Build a level from any integer, clamping into `[0, 5]`
    pub fn new(level: i64) -> Self {
        Self(level.clamp(MIN_MASTERY_LEVEL as i64, MAX_MASTERY_LEVEL as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Table index for this level
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// One step up, saturating at 5
    pub fn raise(self) -> Self {
        Self(self.0.saturating_add(1).min(MAX_MASTERY_LEVEL))
    }

    /// One step down, saturating at 0
    pub fn lower(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Level after an attempt with the given outcome
    pub fn after(self, is_correct: bool) -> Self {
        if is_correct {
            self.raise()
        } else {
            self.lower()
        }
    }

    pub fn is_mastered(self) -> bool {
        self.0 == MAX_MASTERY_LEVEL
    }

    /// Iterate every level from 0 to 5
    pub fn all() -> impl Iterator<Item = Self> {
        (MIN_MASTERY_LEVEL..=MAX_MASTERY_LEVEL).map(Self)
    }
}

impl From<i64> for MasteryLevel {
    fn from(level: i64) -> Self {
        Self::new(level)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==================== Mastery Record ====================

/// Per-user, per-word review state.
///
/// Created lazily by the first attempt on a word; every later attempt replaces
/// it with a new value (see [`crate::scheduler::record_attempt`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    /// Opaque vocabulary item identifier
    pub word_id: String,
    pub mastery_level: MasteryLevel,
    pub correct_count: u32,
    pub incorrect_count: u32,
    /// Time of the most recent attempt
    pub last_reviewed: DateTime<Utc>,
    /// Earliest time the word becomes due again, always after `last_reviewed`
    pub next_review: DateTime<Utc>,
}

impl MasteryRecord {
    pub fn total_attempts(&self) -> u64 {
        self.correct_count as u64 + self.incorrect_count as u64
    }

    /// Fraction of correct attempts, 0.0 when there are none
    pub fn accuracy(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.correct_count as f64 / total as f64
        }
    }
}

/// Storage shape of a [`MasteryRecord`].
///
/// Integers are kept signed and timestamps as strings so that corrupted rows
/// can still be read and repaired by [`crate::sanitize::sanitize_record`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMasteryRecord {
    pub word_id: String,
    pub mastery_level: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    /// ISO-8601 / RFC 3339
    pub last_reviewed: String,
    /// ISO-8601 / RFC 3339
    pub next_review: String,
}

// ==================== Presentation Types ====================

/// One row of the urgency ranking (display only, unrelated to the due check)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyEntry {
    pub word_id: String,
    pub mastery_level: MasteryLevel,
    pub urgency: f64,
    pub days_since_review: f64,
    pub expected_interval_days: u32,
    pub is_due: bool,
}

/// Aggregate view over all of a user's records
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryStats {
    pub total_words: usize,
    /// Level 5
    pub mastered_words: usize,
    /// Levels 1..=4
    pub learning_words: usize,
    /// Level 0
    pub struggling_words: usize,
    pub due_count: usize,
    /// Word count per level, indexed by level
    pub level_distribution: [usize; MASTERY_LEVEL_COUNT],
    pub accuracy: f64,
    /// Earliest `next_review` among words that are not yet due
    pub next_upcoming_review: Option<DateTime<Utc>>,
}

/// Health report for a persisted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDiagnostic {
    pub is_healthy: bool,
    pub level_out_of_range: bool,
    pub negative_counts: bool,
    pub invalid_timestamps: bool,
    pub schedule_inconsistent: bool,
    pub message: String,
}

// ==================== Tests ====================

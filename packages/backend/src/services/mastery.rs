use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use vocab_algo::{
    rank_by_urgency, record_attempt, select_due_words, summarize, MasteryRecord, MasteryStats,
    UrgencyEntry,
};

use crate::store::{MasteryStore, StoreError};

const MAX_WORD_ID_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum MasteryError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Source of the current time; the only non-deterministic scheduler input
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Connects the quiz flow and review views to the store.
///
/// Store calls run on the blocking pool since the file-backed store does
/// synchronous I/O.
#[derive(Clone)]
pub struct MasteryService {
    store: Arc<dyn MasteryStore>,
    clock: Arc<dyn Clock>,
}

impl MasteryService {
    pub fn new(store: Arc<dyn MasteryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn with_system_clock(store: Arc<dyn MasteryStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Current time at millisecond precision, the resolution timestamps are stored at
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Apply a quiz outcome and persist the new record
    pub async fn record_attempt(
        &self,
        user_id: &str,
        word_id: &str,
        is_correct: bool,
    ) -> Result<MasteryRecord, MasteryError> {
        let word_id = validate_word_id(word_id)?;
        let now = self.now();
        let store = Arc::clone(&self.store);
        let user = user_id.to_string();
        let word = word_id.to_string();

        let record = tokio::task::spawn_blocking(move || {
            store.apply(&user, &word, &|previous| {
                record_attempt(previous, &word, is_correct, now)
            })
        })
        .await??;

        tracing::debug!(
            user_id,
            word_id,
            is_correct,
            level = record.mastery_level.get(),
            next_review = %record.next_review,
            "attempt recorded"
        );
        Ok(record)
    }

    pub async fn get_record(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<MasteryRecord>, MasteryError> {
        let word_id = validate_word_id(word_id)?;
        let store = Arc::clone(&self.store);
        let user = user_id.to_string();
        let word = word_id.to_string();
        Ok(tokio::task::spawn_blocking(move || store.get(&user, &word)).await??)
    }

    /// Due records, most overdue first, at most `limit`
    pub async fn due_words(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MasteryRecord>, MasteryError> {
        let records = self.load_all(user_id).await?;
        let now = self.now();
        let due: Vec<MasteryRecord> = select_due_words(&records, now, limit).cloned().collect();
        tracing::debug!(user_id, total = records.len(), due = due.len(), "due words selected");
        Ok(due)
    }

    pub async fn urgent_words(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<UrgencyEntry>, MasteryError> {
        let records = self.load_all(user_id).await?;
        Ok(rank_by_urgency(&records, self.now(), limit))
    }

    pub async fn stats(&self, user_id: &str) -> Result<MasteryStats, MasteryError> {
        let records = self.load_all(user_id).await?;
        Ok(summarize(&records, self.now()))
    }

    async fn load_all(&self, user_id: &str) -> Result<Vec<MasteryRecord>, MasteryError> {
        let store = Arc::clone(&self.store);
        let user = user_id.to_string();
        Ok(tokio::task::spawn_blocking(move || store.list(&user)).await??)
    }
}

fn validate_word_id(word_id: &str) -> Result<&str, MasteryError> {
    let trimmed = word_id.trim();
    if trimmed.is_empty() {
        return Err(MasteryError::Validation("wordId不能为空".to_string()));
    }
    if trimmed.len() > MAX_WORD_ID_LEN {
        return Err(MasteryError::Validation(format!(
            "wordId长度不能超过{MAX_WORD_ID_LEN}"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use parking_lot::Mutex;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut guard = self.0.lock();
            *guard = *guard + by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn service() -> (MasteryService, Arc<ManualClock>) {
        let start = DateTime::parse_from_rfc3339("2024-07-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = Arc::new(ManualClock(Mutex::new(start)));
        let service = MasteryService::new(Arc::new(MemoryStore::new()), clock.clone());
        (service, clock)
    }

    #[tokio::test]
    async fn test_record_attempt_and_due_cycle() {
        let (service, clock) = service();
        let record = service.record_attempt("u1", "apple", true).await.unwrap();
        assert_eq!(record.mastery_level.get(), 1);

        assert!(service.due_words("u1", 20).await.unwrap().is_empty());

        clock.advance(Duration::minutes(10));
        let due = service.due_words("u1", 20).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].word_id, "apple");
    }

    #[tokio::test]
    async fn test_attempts_applied_in_order() {
        let (service, clock) = service();
        for is_correct in [true, true, false, true] {
            service.record_attempt("u1", "apple", is_correct).await.unwrap();
            clock.advance(Duration::minutes(1));
        }
        let record = service.get_record("u1", "apple").await.unwrap().unwrap();
        assert_eq!(record.mastery_level.get(), 2);
        assert_eq!(record.correct_count, 3);
        assert_eq!(record.incorrect_count, 1);
    }

    #[tokio::test]
    async fn test_word_id_is_trimmed_and_validated() {
        let (service, _) = service();
        let record = service.record_attempt("u1", "  apple ", false).await.unwrap();
        assert_eq!(record.word_id, "apple");

        let err = service.record_attempt("u1", "   ", true).await.unwrap_err();
        assert!(matches!(err, MasteryError::Validation(_)));

        let long = "x".repeat(MAX_WORD_ID_LEN + 1);
        assert!(service.get_record("u1", &long).await.is_err());
    }

    #[tokio::test]
    async fn test_recorded_timestamps_survive_persistence() {
        let (service, clock) = service();
        clock.advance(Duration::nanoseconds(123_456_789));

        let record = service.record_attempt("u1", "apple", true).await.unwrap();
        assert_eq!(record.last_reviewed.timestamp_subsec_nanos(), 123_000_000);

        let restored = vocab_algo::sanitize::sanitize_record(&record.to_persisted()).unwrap();
        assert_eq!(restored, record);
    }

    #[tokio::test]
    async fn test_stats_and_urgency() {
        let (service, clock) = service();
        service.record_attempt("u1", "apple", true).await.unwrap();
        service.record_attempt("u1", "pear", false).await.unwrap();
        clock.advance(Duration::days(2));

        let stats = service.stats("u1").await.unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.due_count, 2);
        assert_eq!(stats.struggling_words, 1);

        let urgent = service.urgent_words("u1", 10).await.unwrap();
        assert_eq!(urgent.len(), 2);
        // level 0 expects 1 day, level 1 expects 2 days
        assert_eq!(urgent[0].word_id, "pear");
    }
}

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use vocab_algo::MasteryRecord;

use super::{MasteryStore, RecordUpdate, StoreError};

type UserRecords = HashMap<String, MasteryRecord>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecords>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record without running the scheduler
    pub fn insert(&self, user_id: &str, record: MasteryRecord) {
        self.users
            .write()
            .entry(user_id.to_string())
            .or_default()
            .insert(record.word_id.clone(), record);
    }

    /// Put back a record captured before a failed write; `None` removes the entry
    pub fn restore(&self, user_id: &str, word_id: &str, previous: Option<MasteryRecord>) {
        let mut guard = self.users.write();
        match previous {
            Some(record) => {
                guard
                    .entry(user_id.to_string())
                    .or_default()
                    .insert(word_id.to_string(), record);
            }
            None => {
                if let Some(records) = guard.get_mut(user_id) {
                    records.remove(word_id);
                    if records.is_empty() {
                        guard.remove(user_id);
                    }
                }
            }
        }
    }

    /// Every record grouped by user, sorted by user then word
    pub fn snapshot(&self) -> BTreeMap<String, Vec<MasteryRecord>> {
        let guard = self.users.read();
        guard
            .iter()
            .map(|(user_id, records)| {
                let mut list: Vec<MasteryRecord> = records.values().cloned().collect();
                list.sort_by(|a, b| a.word_id.cmp(&b.word_id));
                (user_id.clone(), list)
            })
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.users.read().values().map(HashMap::len).sum()
    }
}

impl MasteryStore for MemoryStore {
    fn get(&self, user_id: &str, word_id: &str) -> Result<Option<MasteryRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .get(user_id)
            .and_then(|records| records.get(word_id))
            .cloned())
    }

    fn list(&self, user_id: &str) -> Result<Vec<MasteryRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .get(user_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn apply(
        &self,
        user_id: &str,
        word_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<MasteryRecord, StoreError> {
        let mut guard = self.users.write();
        let records = guard.entry(user_id.to_string()).or_default();
        let next = update(records.get(word_id));
        records.insert(word_id.to_string(), next.clone());
        Ok(next)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

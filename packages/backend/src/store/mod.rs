//! Mastery record persistence.
//!
//! The scheduler never touches storage; handlers read a record, hand it to
//! `vocab_algo::record_attempt` and write the result back through
//! [`MasteryStore::apply`], which holds the store's write lock for the whole
//! read-modify-write so attempts on one word land in submission order.
//! Writes from different processes are not coordinated: last write wins.

mod json_file;
mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use vocab_algo::MasteryRecord;

use crate::config::Config;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Update applied inside [`MasteryStore::apply`]; receives the stored record, if any
pub type RecordUpdate<'a> = &'a dyn Fn(Option<&MasteryRecord>) -> MasteryRecord;

pub trait MasteryStore: Send + Sync {
    fn get(&self, user_id: &str, word_id: &str) -> Result<Option<MasteryRecord>, StoreError>;

    /// All records of one user, in no particular order
    fn list(&self, user_id: &str) -> Result<Vec<MasteryRecord>, StoreError>;

    /// Atomic read-modify-write of one (user, word) record; returns the stored result
    fn apply(
        &self,
        user_id: &str,
        word_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<MasteryRecord, StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// Store selected by configuration: snapshot file when `data_file` is set,
/// otherwise in memory.
pub fn from_config(config: &Config) -> Result<Arc<dyn MasteryStore>, StoreError> {
    match config.data_file.as_ref() {
        Some(path) => Ok(Arc::new(JsonFileStore::open(path.clone())?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

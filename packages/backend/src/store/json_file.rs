use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vocab_algo::sanitize::sanitize_record;
use vocab_algo::{MasteryRecord, PersistedMasteryRecord};

use super::{MasteryStore, MemoryStore, RecordUpdate, StoreError};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    version: u32,
    users: BTreeMap<String, Vec<PersistedMasteryRecord>>,
}

/// [`MemoryStore`] mirrored to a JSON snapshot file.
///
/// The whole snapshot is rewritten after every update (temp file + rename).
/// An update whose write fails is rolled back in memory. Rows that cannot be
/// repaired on load are skipped with a warning.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = MemoryStore::new();

        match std::fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                if snapshot.version != SNAPSHOT_VERSION {
                    tracing::warn!(
                        path = %path.display(),
                        version = snapshot.version,
                        "unexpected snapshot version, loading anyway"
                    );
                }
                load_into(&inner, snapshot);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        }

        tracing::info!(
            path = %path.display(),
            records = inner.record_count(),
            "mastery snapshot loaded"
        );

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            users: self
                .inner
                .snapshot()
                .into_iter()
                .map(|(user_id, records)| {
                    (user_id, records.iter().map(MasteryRecord::to_persisted).collect())
                })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn load_into(store: &MemoryStore, snapshot: Snapshot) {
    for (user_id, rows) in snapshot.users {
        for row in rows {
            match sanitize_record(&row) {
                Ok(record) => store.insert(&user_id, record),
                Err(err) => {
                    tracing::warn!(user_id = %user_id, error = %err, "skipping unreadable mastery record");
                }
            }
        }
    }
}

impl MasteryStore for JsonFileStore {
    fn get(&self, user_id: &str, word_id: &str) -> Result<Option<MasteryRecord>, StoreError> {
        self.inner.get(user_id, word_id)
    }

    fn list(&self, user_id: &str) -> Result<Vec<MasteryRecord>, StoreError> {
        self.inner.list(user_id)
    }

    fn apply(
        &self,
        user_id: &str,
        word_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<MasteryRecord, StoreError> {
        // held across update + persist so snapshots are written in update order
        let _guard = self.write_lock.lock();
        let previous = self.inner.get(user_id, word_id)?;
        let record = self.inner.apply(user_id, word_id, update)?;
        if let Err(err) = self.persist() {
            // memory must not run ahead of the file, or a retry applies twice
            self.inner.restore(user_id, word_id, previous);
            tracing::error!(
                user_id,
                word_id,
                error = %err,
                "failed to write mastery snapshot, update rolled back"
            );
            return Err(err);
        }
        Ok(record)
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}

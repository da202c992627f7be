//! JSON-file answer store.
//!
//! Persists the whole key/value space as one JSON document: storage key →
//! JSON-serialized answer set. Operations are read-modify-write; the
//! engine is single-threaded per session, so no file locking is needed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use examdrill_core::answers::AnswerSet;
use examdrill_core::error::StoreError;
use examdrill_core::model::QuestionId;
use examdrill_core::store::{store_key, AnswerStore};

/// A durable `AnswerStore` backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt store degrades to "nothing saved", never a
                // fatal error.
                tracing::warn!(
                    "discarding unreadable answer store {}: {e}",
                    self.path.display()
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries).map_err(StoreError::Encode)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl AnswerStore for JsonFileStore {
    async fn get(&self, id: QuestionId) -> Result<Option<AnswerSet>, StoreError> {
        let entries = self.read_entries()?;
        let Some(raw) = entries.get(&store_key(id)) else {
            return Ok(None);
        };
        match AnswerSet::from_json(raw) {
            Ok(answers) => Ok(Some(answers)),
            Err(e) => {
                tracing::warn!("discarding malformed answers for question {id}: {e}");
                Ok(None)
            }
        }
    }

    async fn set(&self, id: QuestionId, answers: &AnswerSet) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let json = answers.to_json().map_err(StoreError::Encode)?;
        entries.insert(store_key(id), json);
        self.write_entries(&entries)
    }

    async fn delete(&self, id: QuestionId) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(&store_key(id)).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

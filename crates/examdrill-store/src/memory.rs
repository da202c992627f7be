//! In-memory answer store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examdrill_core::answers::AnswerSet;
use examdrill_core::error::StoreError;
use examdrill_core::model::QuestionId;
use examdrill_core::store::{store_key, AnswerStore};

/// An in-memory `AnswerStore` over the same key/value convention the
/// file store uses, so malformed-value handling can be exercised without
/// touching disk.
#[derive(Default)]
pub struct MemoryStore {
    /// Storage key → JSON-serialized answer set.
    entries: Mutex<HashMap<String, String>>,
    /// Number of `set` calls, for asserting persistence at transitions.
    write_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes made to this store.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a raw value under a question's key, bypassing encoding.
    /// Lets tests plant malformed persisted data.
    pub fn insert_raw(&self, id: QuestionId, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(store_key(id), value.to_string());
    }
}

#[async_trait]
impl AnswerStore for MemoryStore {
    async fn get(&self, id: QuestionId) -> Result<Option<AnswerSet>, StoreError> {
        let entries = self.entries.lock().unwrap();
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
        let json = answers.to_json().map_err(StoreError::Encode)?;
        self.entries.lock().unwrap().insert(store_key(id), json);
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, id: QuestionId) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(&store_key(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryStore::new();
        let mut answers = AnswerSet::new();
        answers.set("main", "A");

        store.set(3, &answers).await.unwrap();
        assert_eq!(store.get(3).await.unwrap(), Some(answers));
        assert_eq!(store.write_count(), 1);

        store.delete(3).await.unwrap();
        assert_eq!(store.get(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_entry_is_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.insert_raw(2, "{not valid json");
        assert_eq!(store.get(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_missing_entry_is_not_an_error() {
        let store = MemoryStore::new();
        store.delete(7).await.unwrap();
    }
}

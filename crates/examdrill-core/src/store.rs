//! The answer-store contract.
//!
//! Persistence of in-progress answers is injected into the session engine
//! and the tally behind this trait, so tests run against an in-memory
//! store and the CLI against a JSON file. Implementations live in the
//! `examdrill-store` crate.

use async_trait::async_trait;

use crate::answers::AnswerSet;
use crate::error::StoreError;
use crate::model::QuestionId;

/// Key/value persistence of per-question answer sets.
///
/// One entry per question id; the value is the answer set's flat
/// string-to-string mapping, JSON-serialized. A stored value that fails
/// to parse must be reported as absent (after a warning), never as an
/// error: malformed data degrades to an unanswered question.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Saved answers for a question, or `None` when nothing usable is
    /// stored.
    async fn get(&self, id: QuestionId) -> Result<Option<AnswerSet>, StoreError>;

    /// Persist a question's answers, replacing any previous entry.
    async fn set(&self, id: QuestionId, answers: &AnswerSet) -> Result<(), StoreError>;

    /// Remove a question's entry. Removing an absent entry is not an
    /// error.
    async fn delete(&self, id: QuestionId) -> Result<(), StoreError>;
}

/// Storage key for a question's answer set.
pub fn store_key(id: QuestionId) -> String {
    format!("question_{id}_answers")
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal in-crate store so the engine's own tests do not depend on
    //! the backend crate.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::AnswerStore;
    use crate::answers::AnswerSet;
    use crate::error::StoreError;
    use crate::model::QuestionId;

    #[derive(Default)]
    pub struct TestStore {
        entries: Mutex<HashMap<QuestionId, AnswerSet>>,
    }

    impl TestStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, id: QuestionId, answers: AnswerSet) {
            self.entries.lock().unwrap().insert(id, answers);
        }

        pub fn contains(&self, id: QuestionId) -> bool {
            self.entries.lock().unwrap().contains_key(&id)
        }
    }

    #[async_trait]
    impl AnswerStore for TestStore {
        async fn get(&self, id: QuestionId) -> Result<Option<AnswerSet>, StoreError> {
            Ok(self.entries.lock().unwrap().get(&id).cloned())
        }

        async fn set(&self, id: QuestionId, answers: &AnswerSet) -> Result<(), StoreError> {
            self.entries.lock().unwrap().insert(id, answers.clone());
            Ok(())
        }

        async fn delete(&self, id: QuestionId) -> Result<(), StoreError> {
            self.entries.lock().unwrap().remove(&id);
            Ok(())
        }
    }
}

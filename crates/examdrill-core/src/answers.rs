//! Per-question answer sets and the answer normalizer.
//!
//! An [`AnswerSet`] is the mutable, session-scoped mapping from slot
//! identifier to raw answer string. The normalizer translates between the
//! letter-indexed representation recorded by choice-style inputs and the
//! literal values stored in the answer key, and runs the same translation
//! in reverse for auto-fill.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::letters::{answer_position, position_to_letter};
use crate::model::{AnswerKey, Question, QuestionKind, Shape};

/// Slot for single-answer questions.
pub const MAIN_SLOT: &str = "main";

/// Fixed slots of the multi-part free-text shape.
pub const PART_SLOTS: [&str; 3] = ["part_a", "part_b", "part_c"];

/// Slot for a sub-question at `index` (zero-based).
pub fn sub_slot(index: usize) -> String {
    format!("sub_{index}")
}

/// A question's in-progress answers: slot identifier → raw answer string.
///
/// Serialized as a flat string-to-string JSON object; that JSON document
/// is the value the answer store persists per question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    /// Record an answer. An empty value removes the slot, so a populated
    /// slot is always a non-empty one.
    pub fn set(&mut self, slot: &str, value: &str) {
        if value.is_empty() {
            self.0.remove(slot);
        } else {
            self.0.insert(slot.to_string(), value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every named slot holds a non-empty answer.
    pub fn has_all(&self, slots: &[&str]) -> bool {
        slots
            .iter()
            .all(|slot| self.get(slot).is_some_and(|v| !v.is_empty()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Resolve a recorded letter to the option literal it denotes.
///
/// `None` when the letter does not resolve to a position inside the
/// options list, including the missing-options case; comparisons treat
/// that as a mismatch.
pub fn selected_option<'a>(question: &'a Question, raw: &str) -> Option<&'a str> {
    let position = answer_position(raw)?;
    question.options.get(position).map(String::as_str)
}

/// The value a recorded answer is compared under.
///
/// True/false questions store option literals in their key while the UI
/// records letters, so the letter is resolved through the options list.
/// Every other question compares the raw recorded value: choice keys are
/// already letters and ranked keys are literal rank strings.
pub fn normalize<'a>(question: &'a Question, raw: &'a str) -> Option<&'a str> {
    if question.kind == QuestionKind::TrueFalse && !question.options.is_empty() {
        selected_option(question, raw)
    } else {
        Some(raw)
    }
}

/// Build the answer set a user would have produced by answering every
/// part correctly, by running [`normalize`] in reverse over the key.
///
/// For true/false sub-questions the key literal's position in `options`
/// is converted back to a letter; a literal absent from `options` is
/// stored verbatim, which the forward grading path will then reject.
/// That inconsistency is inherited behavior, surfaced by bank validation
/// rather than resolved here.
pub fn fill_correct(question: &Question) -> AnswerSet {
    let mut answers = AnswerSet::new();

    if !question.sub_questions.is_empty() {
        for (index, sub) in question.sub_questions.iter().enumerate() {
            let value = if question.kind == QuestionKind::TrueFalse && !question.options.is_empty()
            {
                match question
                    .options
                    .iter()
                    .position(|opt| *opt == sub.correct_answer)
                    .and_then(position_to_letter)
                {
                    Some(letter) => letter.to_string(),
                    None => sub.correct_answer.clone(),
                }
            } else {
                sub.correct_answer.clone()
            };
            answers.set(&sub_slot(index), &value);
        }
        return answers;
    }

    if let AnswerKey::Single(key) = &question.correct_answer {
        let slot = if question.shape() == Shape::MultiPartFreeText {
            // Only part_a carries a key; parts b and c stay empty.
            PART_SLOTS[0]
        } else {
            MAIN_SLOT
        };
        answers.set(slot, key);
    }

    answers
}

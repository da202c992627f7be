//! Session-level scoring over persisted answers.
//!
//! The tally re-reads the answer store for every in-range question rather
//! than reusing in-memory per-question results, and it excludes
//! unanswered slots from both the numerator and the denominator: an
//! unattempted slot is neither right nor wrong.

use serde::{Deserialize, Serialize};

use crate::answers::{normalize, sub_slot, AnswerSet, MAIN_SLOT};
use crate::error::StoreError;
use crate::grader::text_matches;
use crate::model::{AnswerKey, Bank, Question};
use crate::store::AnswerStore;

/// Aggregate (correct, attempted) counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub attempted: u32,
}

impl Tally {
    /// Rounded percentage of attempted slots answered correctly; 0 when
    /// nothing was attempted.
    pub fn percentage(&self) -> u32 {
        if self.attempted == 0 {
            0
        } else {
            (f64::from(self.correct) / f64::from(self.attempted) * 100.0).round() as u32
        }
    }

    fn add(&mut self, other: Tally) {
        self.correct += other.correct;
        self.attempted += other.attempted;
    }
}

/// Score one question's persisted answers.
///
/// Sub-question slots are scored individually; everything else is scored
/// through the `"main"` slot, so a multi-part free-text question (which
/// only ever writes `part_*` slots) contributes nothing here. That gap is
/// inherited, documented behavior.
pub fn question_tally(question: &Question, answers: &AnswerSet) -> Tally {
    let mut tally = Tally::default();

    if !question.sub_questions.is_empty() {
        for (index, sub) in question.sub_questions.iter().enumerate() {
            let Some(raw) = answers.get(&sub_slot(index)) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            tally.attempted += 1;
            let matched = normalize(question, raw)
                .is_some_and(|value| value == sub.correct_answer);
            if matched {
                tally.correct += 1;
            }
        }
        return tally;
    }

    let raw = answers.get(MAIN_SLOT).unwrap_or_default();
    if raw.is_empty() {
        return tally;
    }
    tally.attempted = 1;

    match &question.correct_answer {
        AnswerKey::Single(key) if !question.options.is_empty() && key.len() == 1 => {
            if raw == key {
                tally.correct = 1;
            }
        }
        AnswerKey::Single(key) => {
            if text_matches(raw, key) {
                tally.correct = 1;
            }
        }
        // An array key without sub-questions counts as attempted but can
        // never match.
        AnswerKey::PerSub(_) => {}
    }

    tally
}

/// Compute the aggregate tally for every visible question by re-reading
/// the store. Questions with no stored entry score as fully unattempted.
pub async fn tally(bank: &Bank, store: &dyn AnswerStore) -> Result<Tally, StoreError> {
    let mut total = Tally::default();
    for question in bank.visible_questions() {
        let answers = store.get(question.id).await?.unwrap_or_default();
        total.add(question_tally(question, &answers));
    }
    Ok(total)
}

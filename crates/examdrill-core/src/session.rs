//! The session navigator.
//!
//! A state machine over the bank's visible question ids: one `Active`
//! state per question (with a revealed-answer sub-state) and a terminal
//! `Results` state. Every transition persists the in-memory answer set
//! before moving, so the results-stage tally can re-read the store as the
//! single source of truth.

use std::sync::Arc;
use std::time::Duration;

use crate::answers::{fill_correct, AnswerSet, PART_SLOTS};
use crate::error::EngineError;
use crate::grader::is_correct;
use crate::model::{Bank, Question, QuestionId, Shape};
use crate::store::AnswerStore;
use crate::tally::{tally, Tally};

/// Tuning knobs for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pause before the results-stage tally reads the store, letting the
    /// final writes settle.
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
        }
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Presenting a question; `revealed` is set once the answer was
    /// submitted and shown.
    Active { id: QuestionId, revealed: bool },
    /// Terminal results stage.
    Results,
}

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Move to this in-range question.
    Goto(QuestionId),
    /// Past the last in-range question: the results stage.
    Results,
    /// Boundary no-op; the state is unchanged.
    Stay,
}

/// Pure navigation over the visible id sequence.
///
/// A `current` id outside the visible range redirects to the first
/// in-range id regardless of direction.
pub fn navigate(bank: &Bank, current: QuestionId, direction: Direction) -> NavOutcome {
    let ids = bank.visible_ids();
    let Some(&first) = ids.first() else {
        return NavOutcome::Stay;
    };
    if !ids.contains(&current) {
        return NavOutcome::Goto(first);
    }

    match direction {
        Direction::Next => match ids.iter().copied().find(|&id| id > current) {
            Some(next) => NavOutcome::Goto(next),
            None => NavOutcome::Results,
        },
        Direction::Previous => match ids.iter().rev().copied().find(|&id| id < current) {
            Some(prev) => NavOutcome::Goto(prev),
            None => NavOutcome::Stay,
        },
    }
}

/// A single learner's pass through the bank's visible questions.
pub struct Session {
    bank: Bank,
    store: Arc<dyn AnswerStore>,
    config: SessionConfig,
    state: SessionState,
    answers: AnswerSet,
}

impl Session {
    /// Start at the first visible question, loading any previously saved
    /// answers for it.
    pub async fn start(
        bank: Bank,
        store: Arc<dyn AnswerStore>,
        config: SessionConfig,
    ) -> Result<Self, EngineError> {
        let first = bank.first_id().ok_or(EngineError::EmptyBank)?;
        let mut session = Self {
            bank,
            store,
            config,
            state: SessionState::Active {
                id: first,
                revealed: false,
            },
            answers: AnswerSet::new(),
        };
        session.load_current().await?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The question being presented, or `None` at the results stage.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::Active { id, .. } => self.bank.question(id),
            SessionState::Results => None,
        }
    }

    fn active_id(&self) -> Result<QuestionId, EngineError> {
        match self.state {
            SessionState::Active { id, .. } => Ok(id),
            SessionState::Results => Err(EngineError::SessionFinished),
        }
    }

    fn current(&self) -> Result<&Question, EngineError> {
        let id = self.active_id()?;
        self.bank.question(id).ok_or(EngineError::QuestionNotFound(id))
    }

    async fn load_current(&mut self) -> Result<(), EngineError> {
        let id = self.active_id()?;
        self.answers = self.store.get(id).await?.unwrap_or_default();
        Ok(())
    }

    async fn persist(&self) -> Result<(), EngineError> {
        let id = self.active_id()?;
        self.store.set(id, &self.answers).await?;
        Ok(())
    }

    /// Jump to a question. Ids outside the visible range redirect to the
    /// first in-range id; the answer is hidden and the in-memory set is
    /// reloaded from the store.
    pub async fn visit(&mut self, id: QuestionId) -> Result<(), EngineError> {
        let first = self.bank.first_id().ok_or(EngineError::EmptyBank)?;
        let target = if self.bank.in_range(id) { id } else { first };
        self.state = SessionState::Active {
            id: target,
            revealed: false,
        };
        self.load_current().await
    }

    /// Record an answer for a slot and persist the set immediately.
    pub async fn answer(&mut self, slot: &str, value: &str) -> Result<(), EngineError> {
        self.active_id()?;
        self.answers.set(slot, value);
        self.persist().await
    }

    /// Populate every slot with its correct value (test/debug affordance)
    /// and persist, so the standard grading path reports fully correct.
    pub async fn auto_fill(&mut self) -> Result<(), EngineError> {
        let question = self.current()?;
        self.answers = fill_correct(question);
        self.persist().await
    }

    /// Whether the submit guard passes for the current answer set: the
    /// multi-part free-text shape needs all three parts populated, every
    /// other shape needs at least one slot.
    pub fn can_submit(&self) -> bool {
        let Ok(question) = self.current() else {
            return false;
        };
        match question.shape() {
            Shape::MultiPartFreeText => self.answers.has_all(&PART_SLOTS),
            _ => !self.answers.is_empty(),
        }
    }

    /// Persist and reveal the answer; returns whether the recorded
    /// answers were fully correct, for immediate feedback. The id does
    /// not change.
    pub async fn submit(&mut self) -> Result<bool, EngineError> {
        let id = self.active_id()?;
        if !self.can_submit() {
            return Err(EngineError::IncompleteAnswers(id));
        }
        self.persist().await?;
        self.state = SessionState::Active { id, revealed: true };
        let question = self.current()?;
        Ok(is_correct(question, &self.answers))
    }

    /// Persist and advance. The last in-range question transitions to the
    /// results stage instead.
    pub async fn next(&mut self) -> Result<SessionState, EngineError> {
        let id = self.active_id()?;
        self.persist().await?;
        match navigate(&self.bank, id, Direction::Next) {
            NavOutcome::Goto(next) => {
                self.state = SessionState::Active {
                    id: next,
                    revealed: false,
                };
                self.load_current().await?;
            }
            NavOutcome::Results => {
                self.answers = AnswerSet::new();
                self.state = SessionState::Results;
            }
            NavOutcome::Stay => {}
        }
        Ok(self.state)
    }

    /// Move back one question; a silent no-op at the first in-range id.
    pub async fn previous(&mut self) -> Result<SessionState, EngineError> {
        let id = self.active_id()?;
        if let NavOutcome::Goto(prev) = navigate(&self.bank, id, Direction::Previous) {
            self.persist().await?;
            self.state = SessionState::Active {
                id: prev,
                revealed: false,
            };
            self.load_current().await?;
        }
        Ok(self.state)
    }

    /// Results-stage tally. Waits out the settle delay so the final
    /// per-question writes are durable before the aggregate read.
    pub async fn finish(&self) -> Result<Tally, EngineError> {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
        Ok(tally(&self.bank, self.store.as_ref()).await?)
    }

    /// Erase every in-range question's persisted answers and return to
    /// the first question with an empty set.
    pub async fn restart(&mut self) -> Result<(), EngineError> {
        for id in self.bank.visible_ids() {
            self.store.delete(id).await?;
        }
        let first = self.bank.first_id().ok_or(EngineError::EmptyBank)?;
        self.state = SessionState::Active {
            id: first,
            revealed: false,
        };
        self.answers = AnswerSet::new();
        Ok(())
    }
}

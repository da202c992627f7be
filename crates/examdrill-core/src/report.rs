//! Session report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Bank, QuestionId};
use crate::store::AnswerStore;
use crate::tally::{question_tally, Tally};

/// The final score artifact of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the bank that was drilled.
    pub bank: BankSummary,
    /// Aggregate (correct, attempted) counts.
    pub tally: Tally,
    /// Rounded percentage; 0 when nothing was attempted.
    pub percentage: u32,
    /// Per-question breakdown, in id order.
    pub questions: Vec<QuestionOutcome>,
}

/// Summary of a bank (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// One question's contribution to the tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub title: String,
    pub tally: Tally,
}

impl SessionReport {
    /// Build a report by re-reading the persisted answers for every
    /// visible question.
    pub async fn collect(bank: &Bank, store: &dyn AnswerStore) -> Result<Self, StoreError> {
        let mut total = Tally::default();
        let mut questions = Vec::new();

        for question in bank.visible_questions() {
            let answers = store.get(question.id).await?.unwrap_or_default();
            let tally = question_tally(question, &answers);
            total.correct += tally.correct;
            total.attempted += tally.attempted;
            questions.push(QuestionOutcome {
                question_id: question.id,
                title: question.title.clone(),
                tally,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                question_count: bank.visible_questions().count(),
            },
            tally: total,
            percentage: total.percentage(),
            questions,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{}:** {}/{} correct ({}%)\n\n",
            self.bank.name, self.tally.correct, self.tally.attempted, self.percentage
        ));

        md.push_str("| Question | Title | Attempted | Correct |\n");
        md.push_str("|----------|-------|-----------|---------|\n");
        for q in &self.questions {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                q.question_id, q.title, q.tally.attempted, q.tally.correct
            ));
        }

        md
    }
}

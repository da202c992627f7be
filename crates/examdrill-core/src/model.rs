//! Core data model types for examdrill.
//!
//! These are the fundamental types that the entire examdrill system uses
//! to represent questions, answer keys, and question banks. The bank is
//! immutable input: nothing in the engine mutates a loaded `Bank`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a question. Unique within a bank, positive, and defines
/// the natural presentation order.
pub type QuestionId = u32;

/// Rendering/grading category a question is tagged with in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Exception,
    BigO,
    Matching,
    TrueFalse,
    ShortAnswer,
    Code,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Exception => write!(f, "exception"),
            QuestionKind::BigO => write!(f, "bigo"),
            QuestionKind::Matching => write!(f, "matching"),
            QuestionKind::TrueFalse => write!(f, "truefalse"),
            QuestionKind::ShortAnswer => write!(f, "shortanswer"),
            QuestionKind::Code => write!(f, "code"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exception" => Ok(QuestionKind::Exception),
            "bigo" => Ok(QuestionKind::BigO),
            "matching" => Ok(QuestionKind::Matching),
            "truefalse" => Ok(QuestionKind::TrueFalse),
            "shortanswer" => Ok(QuestionKind::ShortAnswer),
            "code" => Ok(QuestionKind::Code),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// One part of a multi-part question. Graded independently, addressed by
/// its zero-based position within the parent question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubQuestion {
    /// Short label shown for this part (e.g. "Method A").
    pub label: String,
    /// Verbatim source snippet for display, if any.
    #[serde(default)]
    pub code: String,
    /// Expected answer for this part: a letter for choice parts, the
    /// option literal for true/false parts, a rank string for ranked parts.
    pub correct_answer: String,
}

/// The embedded answer key: a single string for single-answer questions,
/// or one string per sub-question, positionally aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Single(String),
    PerSub(Vec<String>),
}

impl AnswerKey {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            AnswerKey::Single(s) => Some(s),
            AnswerKey::PerSub(_) => None,
        }
    }

    pub fn as_per_sub(&self) -> Option<&[String]> {
        match self {
            AnswerKey::Single(_) => None,
            AnswerKey::PerSub(keys) => Some(keys),
        }
    }
}

/// Structural category of a question. Grading and the submit guard
/// dispatch on shape, never on literal question identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Single answer selected from lettered options; the key is the letter.
    Choice,
    /// Single free-text answer, compared trimmed and case-insensitively.
    FreeText,
    /// Independent sub-questions answered by letter. For true/false kinds
    /// the key stores the option literal and the recorded letter is
    /// resolved through the options list before comparison.
    SubQuestionChoice,
    /// Sub-questions assigned literal rank strings; compared verbatim.
    Ranked,
    /// Fixed `part_a`/`part_b`/`part_c` free-text parts. Only `part_a` is
    /// ever graded; parts b and c are collected and required for
    /// submission but not scored.
    MultiPartFreeText,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Choice => write!(f, "choice"),
            Shape::FreeText => write!(f, "free_text"),
            Shape::SubQuestionChoice => write!(f, "sub_question_choice"),
            Shape::Ranked => write!(f, "ranked"),
            Shape::MultiPartFreeText => write!(f, "multi_part_free_text"),
        }
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "choice" => Ok(Shape::Choice),
            "free_text" => Ok(Shape::FreeText),
            "sub_question_choice" => Ok(Shape::SubQuestionChoice),
            "ranked" => Ok(Shape::Ranked),
            "multi_part_free_text" => Ok(Shape::MultiPartFreeText),
            other => Err(format!("unknown question shape: {other}")),
        }
    }
}

/// A single question record from the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier; defines natural ordering.
    pub id: QuestionId,
    /// Rendering/grading category.
    pub kind: QuestionKind,
    /// Human-readable title.
    pub title: String,
    /// Question prose.
    #[serde(default)]
    pub content: String,
    /// Verbatim source snippet for display, if any.
    #[serde(default)]
    pub code: Option<String>,
    /// Ordered options; each is addressable by its zero-based position
    /// mapped to a letter (`A`, `B`, ...).
    #[serde(default)]
    pub options: Vec<String>,
    /// Sub-questions; when non-empty the question is multi-part and each
    /// part is graded independently.
    #[serde(default)]
    pub sub_questions: Vec<SubQuestion>,
    /// The answer key. `PerSub` must align 1:1 with `sub_questions`.
    pub correct_answer: AnswerKey,
    /// Free text shown after grading; never consulted by grading logic.
    #[serde(default)]
    pub explanation: String,
    /// Explicit shape tag. `Ranked` and `MultiPartFreeText` must be
    /// tagged; the other shapes are inferred from structure when absent.
    #[serde(default, rename = "shape")]
    pub shape_tag: Option<Shape>,
}

impl Question {
    /// The structural shape this question is graded under.
    pub fn shape(&self) -> Shape {
        self.shape_tag.unwrap_or_else(|| self.inferred_shape())
    }

    fn inferred_shape(&self) -> Shape {
        if !self.sub_questions.is_empty() {
            Shape::SubQuestionChoice
        } else if !self.options.is_empty()
            && matches!(&self.correct_answer, AnswerKey::Single(s) if s.len() == 1)
        {
            Shape::Choice
        } else {
            Shape::FreeText
        }
    }
}

/// An ordered, immutable collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// Highest question id presented during a session. Questions with
    /// larger ids stay in the bank as reference material. `None` makes
    /// every question visible.
    #[serde(default)]
    pub visible_through: Option<QuestionId>,
    /// The questions, sorted by id.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Bank {
    fn cutoff(&self) -> QuestionId {
        self.visible_through.unwrap_or(QuestionId::MAX)
    }

    /// Questions inside the visible subrange, in id order.
    pub fn visible_questions(&self) -> impl Iterator<Item = &Question> + '_ {
        let cutoff = self.cutoff();
        self.questions.iter().filter(move |q| q.id <= cutoff)
    }

    /// Ids of the visible questions, in order.
    pub fn visible_ids(&self) -> Vec<QuestionId> {
        self.visible_questions().map(|q| q.id).collect()
    }

    /// First visible question id, if the visible range is non-empty.
    pub fn first_id(&self) -> Option<QuestionId> {
        self.visible_questions().map(|q| q.id).next()
    }

    /// Last visible question id, if the visible range is non-empty.
    pub fn last_id(&self) -> Option<QuestionId> {
        self.visible_questions().map(|q| q.id).last()
    }

    /// Whether `id` names a visible question.
    pub fn in_range(&self, id: QuestionId) -> bool {
        self.visible_questions().any(|q| q.id == id)
    }

    /// Look up a question by id, visible or not.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: QuestionId) -> Question {
        Question {
            id,
            kind: QuestionKind::BigO,
            title: format!("Question {id}"),
            content: String::new(),
            code: None,
            options: vec!["first".into(), "second".into()],
            sub_questions: vec![],
            correct_answer: AnswerKey::Single("A".into()),
            explanation: String::new(),
            shape_tag: None,
        }
    }

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(QuestionKind::TrueFalse.to_string(), "truefalse");
        assert_eq!(QuestionKind::BigO.to_string(), "bigo");
        assert_eq!(
            "truefalse".parse::<QuestionKind>().unwrap(),
            QuestionKind::TrueFalse
        );
        assert_eq!(
            "ShortAnswer".parse::<QuestionKind>().unwrap(),
            QuestionKind::ShortAnswer
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn shape_display_and_parse() {
        assert_eq!(Shape::Ranked.to_string(), "ranked");
        assert_eq!(
            "multi_part_free_text".parse::<Shape>().unwrap(),
            Shape::MultiPartFreeText
        );
        assert!("grid".parse::<Shape>().is_err());
    }

    #[test]
    fn shape_inference() {
        let choice = question(1);
        assert_eq!(choice.shape(), Shape::Choice);

        let mut free_text = question(2);
        free_text.options.clear();
        free_text.correct_answer = AnswerKey::Single("O(N)".into());
        assert_eq!(free_text.shape(), Shape::FreeText);

        let mut multi = question(3);
        multi.sub_questions = vec![SubQuestion {
            label: "Part 1".into(),
            code: String::new(),
            correct_answer: "B".into(),
        }];
        multi.correct_answer = AnswerKey::PerSub(vec!["B".into()]);
        assert_eq!(multi.shape(), Shape::SubQuestionChoice);

        let mut ranked = multi.clone();
        ranked.shape_tag = Some(Shape::Ranked);
        assert_eq!(ranked.shape(), Shape::Ranked);
    }

    #[test]
    fn answer_key_serde_shapes() {
        let single: AnswerKey = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(single.as_single(), Some("A"));

        let per_sub: AnswerKey = serde_json::from_str("[\"B\",\"A\"]").unwrap();
        assert_eq!(
            per_sub.as_per_sub().map(<[String]>::len),
            Some(2)
        );
    }

    #[test]
    fn bank_visible_range() {
        let bank = Bank {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            visible_through: Some(6),
            questions: vec![question(1), question(2), question(6), question(9)],
        };

        assert_eq!(bank.visible_ids(), vec![1, 2, 6]);
        assert_eq!(bank.first_id(), Some(1));
        assert_eq!(bank.last_id(), Some(6));
        assert!(bank.in_range(2));
        assert!(!bank.in_range(9));
        assert!(!bank.in_range(7));
        assert!(bank.question(9).is_some());
    }

    #[test]
    fn bank_without_cutoff_shows_everything() {
        let bank = Bank {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            visible_through: None,
            questions: vec![question(1), question(9)],
        };
        assert_eq!(bank.visible_ids(), vec![1, 9]);
    }
}

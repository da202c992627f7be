//! TOML question-bank parser.
//!
//! Loads banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::letters::answer_position;
use crate::model::{AnswerKey, Bank, Question, QuestionKind, Shape, SubQuestion};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    visible_through: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    kind: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    sub_questions: Vec<TomlSubQuestion>,
    correct_answer: AnswerKey,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    shape: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlSubQuestion {
    label: String,
    #[serde(default)]
    code: String,
    correct_answer: String,
}

/// Parse a single TOML file into a `Bank`.
pub fn parse_bank(path: &Path) -> Result<Bank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `Bank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<Bank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let shape_tag = q
                .shape
                .map(|s| {
                    s.parse::<Shape>()
                        .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))
                })
                .transpose()?;

            let sub_questions = q
                .sub_questions
                .into_iter()
                .map(|s| SubQuestion {
                    label: s.label,
                    code: s.code,
                    correct_answer: s.correct_answer,
                })
                .collect();

            Ok(Question {
                id: q.id,
                kind,
                title: q.title,
                content: q.content,
                code: q.code,
                options: q.options,
                sub_questions,
                correct_answer: q.correct_answer,
                explanation: q.explanation,
                shape_tag,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Id order is the presentation order.
    questions.sort_by_key(|q| q.id);

    Ok(Bank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        visible_through: parsed.bank.visible_through,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<Bank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

fn warn(warnings: &mut Vec<ValidationWarning>, question_id: Option<u32>, message: String) {
    warnings.push(ValidationWarning {
        question_id,
        message,
    });
}

/// Validate a bank for common issues.
pub fn validate_bank(bank: &Bank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.first_id().is_none() {
        warn(
            &mut warnings,
            None,
            "no questions fall inside the visible range".into(),
        );
    }

    let mut seen_ids = std::collections::HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(q.id) {
            warn(&mut warnings, Some(q.id), format!("duplicate question id: {}", q.id));
        }
    }

    for q in &bank.questions {
        if q.id == 0 {
            warn(&mut warnings, Some(q.id), "question id must be positive".into());
        }

        match (&q.correct_answer, q.sub_questions.len()) {
            (AnswerKey::PerSub(_), 0) => warn(
                &mut warnings,
                Some(q.id),
                "array answer key without sub-questions can never be marked correct".into(),
            ),
            (AnswerKey::PerSub(keys), n) if keys.len() != n => warn(
                &mut warnings,
                Some(q.id),
                format!(
                    "answer key has {} entries but the question has {} sub-questions",
                    keys.len(),
                    n
                ),
            ),
            (AnswerKey::Single(_), n) if n > 0 => warn(
                &mut warnings,
                Some(q.id),
                "question has sub-questions but a single answer key".into(),
            ),
            _ => {}
        }

        if q.shape() == Shape::Choice {
            if let AnswerKey::Single(key) = &q.correct_answer {
                match answer_position(key) {
                    Some(position) if position < q.options.len() => {}
                    _ => warn(
                        &mut warnings,
                        Some(q.id),
                        format!("answer key '{key}' does not address an option"),
                    ),
                }
            }
        }

        if q.kind == QuestionKind::TrueFalse {
            if q.options.is_empty() {
                warn(
                    &mut warnings,
                    Some(q.id),
                    "truefalse question without options can never be graded correct".into(),
                );
            } else {
                for sub in &q.sub_questions {
                    if !q.options.contains(&sub.correct_answer) {
                        warn(
                            &mut warnings,
                            Some(q.id),
                            format!(
                                "truefalse key '{}' is not an option literal; \
                                 auto-fill will store it verbatim and grading will reject it",
                                sub.correct_answer
                            ),
                        );
                    }
                }
            }
        }

        match q.shape_tag {
            Some(Shape::Ranked) if q.sub_questions.is_empty() => warn(
                &mut warnings,
                Some(q.id),
                "ranked shape requires sub-questions".into(),
            ),
            Some(Shape::MultiPartFreeText) if !q.sub_questions.is_empty() => warn(
                &mut warnings,
                Some(q.id),
                "multi_part_free_text shape must not carry sub-questions".into(),
            ),
            Some(Shape::MultiPartFreeText)
                if q.correct_answer.as_single().is_none() =>
            {
                warn(
                    &mut warnings,
                    Some(q.id),
                    "multi_part_free_text shape needs a single answer key for part_a".into(),
                )
            }
            _ => {}
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
id = "sample"
name = "Sample Bank"
description = "A sample question bank"
visible_through = 6

[[questions]]
id = 1
kind = "bigo"
title = "Pick one"
content = "Which option is right?"
options = ["first", "second", "third"]
correct_answer = "B"
explanation = "The second one."

[[questions]]
id = 6
kind = "truefalse"
title = "True or false"
content = "Decide."
options = ["T", "F"]
correct_answer = ["T", "F"]

[[questions.sub_questions]]
label = "First claim"
correct_answer = "T"

[[questions.sub_questions]]
label = "Second claim"
correct_answer = "F"

[[questions]]
id = 11
kind = "bigo"
title = "Rank these"
content = "Order them."
shape = "ranked"
options = ["1", "2"]
correct_answer = ["2", "1"]

[[questions.sub_questions]]
label = "O(N)"
correct_answer = "2"

[[questions.sub_questions]]
label = "O(1)"
correct_answer = "1"
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "sample");
        assert_eq!(bank.questions.len(), 3);
        assert_eq!(bank.visible_through, Some(6));

        let q1 = bank.question(1).unwrap();
        assert_eq!(q1.kind, QuestionKind::BigO);
        assert_eq!(q1.shape(), Shape::Choice);
        assert_eq!(q1.correct_answer.as_single(), Some("B"));

        let q6 = bank.question(6).unwrap();
        assert_eq!(q6.sub_questions.len(), 2);
        assert_eq!(q6.shape(), Shape::SubQuestionChoice);

        let q11 = bank.question(11).unwrap();
        assert_eq!(q11.shape(), Shape::Ranked);
    }

    #[test]
    fn parse_sorts_questions_by_id() {
        let toml = r#"
[bank]
id = "unordered"
name = "Unordered"

[[questions]]
id = 3
kind = "code"
title = "Third"
correct_answer = "x"

[[questions]]
id = 1
kind = "code"
title = "First"
correct_answer = "y"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let ids: Vec<u32> = bank.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let toml = r#"
[bank]
id = "bad"
name = "Bad"

[[questions]]
id = 1
kind = "essay"
title = "Nope"
correct_answer = "A"
"#;
        let result = parse_bank_str(toml, &PathBuf::from("test.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_clean_bank() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[bank]
id = "dupes"
name = "Dupes"

[[questions]]
id = 1
kind = "code"
title = "First"
correct_answer = "x"

[[questions]]
id = 1
kind = "code"
title = "Second"
correct_answer = "y"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_key_arity_mismatch() {
        let mut bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        if let AnswerKey::PerSub(keys) = &mut bank.questions[1].correct_answer {
            keys.pop();
        }
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("sub-questions") && w.question_id == Some(6)));
    }

    #[test]
    fn validate_true_false_key_not_in_options() {
        let mut bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        bank.questions[1].sub_questions[0].correct_answer = "True".into();
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("auto-fill")));
    }

    #[test]
    fn validate_choice_key_outside_options() {
        let mut bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        bank.questions[0].correct_answer = AnswerKey::Single("Z".into());
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("does not address an option")));
    }

    #[test]
    fn validate_empty_visible_range() {
        let mut bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        bank.visible_through = Some(0);
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("visible range")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("sample.toml");
        std::fs::write(&file_path, VALID_TOML).unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, "sample");
    }
}

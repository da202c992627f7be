//! Per-question correctness for immediate feedback.
//!
//! Dispatches on the question's [`Shape`]: every shape maps its recorded
//! slots onto the answer key with its own equivalence rule. The session
//! tally in [`crate::tally`] applies the same rules but with a different
//! treatment of unanswered slots; the two paths differ intentionally.

use crate::answers::{normalize, sub_slot, AnswerSet, MAIN_SLOT, PART_SLOTS};
use crate::model::{Question, Shape};

/// Trimmed, case-insensitive text equality.
pub(crate) fn text_matches(answer: &str, key: &str) -> bool {
    answer.trim().to_lowercase() == key.trim().to_lowercase()
}

/// Whether the recorded answers fully satisfy the question's key.
///
/// An unanswered required slot counts as incorrect here; the session
/// tally instead excludes unanswered slots from the score entirely.
pub fn is_correct(question: &Question, answers: &AnswerSet) -> bool {
    match question.shape() {
        // Only part_a is graded; parts b and c are collected but never
        // scored.
        Shape::MultiPartFreeText => match question.correct_answer.as_single() {
            Some(key) => answers
                .get(PART_SLOTS[0])
                .is_some_and(|part_a| text_matches(part_a, key)),
            None => false,
        },

        // Every sub-question must match its key. Ranked parts compare the
        // literal rank string; true/false parts resolve the recorded
        // letter through the options list first.
        Shape::SubQuestionChoice | Shape::Ranked => question
            .sub_questions
            .iter()
            .enumerate()
            .all(|(index, sub)| {
                answers
                    .get(&sub_slot(index))
                    .and_then(|raw| normalize(question, raw))
                    .is_some_and(|value| value == sub.correct_answer)
            }),

        Shape::Choice => match question.correct_answer.as_single() {
            Some(key) => answers.get(MAIN_SLOT).is_some_and(|raw| raw == key),
            None => false,
        },

        Shape::FreeText => match question.correct_answer.as_single() {
            Some(key) => answers
                .get(MAIN_SLOT)
                .is_some_and(|raw| text_matches(raw, key)),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::fill_correct;
    use crate::model::{QuestionKind, SubQuestion};

    fn sub(label: &str, key: &str) -> SubQuestion {
        SubQuestion {
            label: label.into(),
            code: String::new(),
            correct_answer: key.into(),
        }
    }

    fn base(id: u32, kind: QuestionKind) -> Question {
        Question {
            id,
            kind,
            title: format!("Question {id}"),
            content: String::new(),
            code: None,
            options: vec![],
            sub_questions: vec![],
            correct_answer: AnswerKey::Single("A".into()),
            explanation: String::new(),
            shape_tag: None,
        }
    }

    fn true_false() -> Question {
        let mut q = base(6, QuestionKind::TrueFalse);
        q.options = vec!["T".into(), "F".into()];
        q.sub_questions = vec![sub("First", "T"), sub("Second", "F")];
        q.correct_answer = AnswerKey::PerSub(vec!["T".into(), "F".into()]);
        q
    }

    fn ranked() -> Question {
        let mut q = base(11, QuestionKind::BigO);
        q.options = vec!["1".into(), "2".into(), "3".into()];
        q.sub_questions = vec![sub("O(N)", "2"), sub("O(1)", "1"), sub("O(N²)", "3")];
        q.correct_answer = AnswerKey::PerSub(vec!["2".into(), "1".into(), "3".into()]);
        q.shape_tag = Some(Shape::Ranked);
        q
    }

    fn multi_part() -> Question {
        let mut q = base(12, QuestionKind::ShortAnswer);
        q.correct_answer = AnswerKey::Single("O(N)".into());
        q.shape_tag = Some(Shape::MultiPartFreeText);
        q
    }

    #[test]
    fn choice_letter_must_match_exactly() {
        let mut q = base(1, QuestionKind::BigO);
        q.options = vec!["x".into(), "y".into()];
        q.correct_answer = AnswerKey::Single("A".into());

        let mut answers = AnswerSet::new();
        answers.set(MAIN_SLOT, "A");
        assert!(is_correct(&q, &answers));

        answers.set(MAIN_SLOT, "a");
        assert!(!is_correct(&q, &answers));

        answers.set(MAIN_SLOT, "B");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn free_text_is_trimmed_and_case_insensitive() {
        let mut q = base(2, QuestionKind::ShortAnswer);
        q.correct_answer = AnswerKey::Single("O(log N)".into());

        let mut answers = AnswerSet::new();
        answers.set(MAIN_SLOT, "  o(LOG n) ");
        assert!(is_correct(&q, &answers));

        answers.set(MAIN_SLOT, "O(N)");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn true_false_letter_resolves_through_options() {
        let q = true_false();

        // B → position 1 → "F" → matches the second sub-question's key.
        let mut answers = AnswerSet::new();
        answers.set("sub_0", "A");
        answers.set("sub_1", "B");
        assert!(is_correct(&q, &answers));

        answers.set("sub_1", "A");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn true_false_without_options_fails_closed() {
        let mut q = true_false();
        q.options.clear();

        let mut answers = AnswerSet::new();
        answers.set("sub_0", "A");
        answers.set("sub_1", "B");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn missing_sub_answer_fails_the_every_check() {
        let q = true_false();
        let mut answers = AnswerSet::new();
        answers.set("sub_0", "A");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn ranked_compares_rank_literals() {
        let q = ranked();
        let mut answers = AnswerSet::new();
        answers.set("sub_0", "2");
        answers.set("sub_1", "1");
        answers.set("sub_2", "3");
        assert!(is_correct(&q, &answers));

        answers.set("sub_0", "1");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn multi_part_grades_only_part_a() {
        let q = multi_part();
        let mut answers = AnswerSet::new();
        answers.set("part_a", " o(n) ");
        answers.set("part_b", "wrong");
        answers.set("part_c", "also wrong");
        assert!(is_correct(&q, &answers));

        answers.set("part_a", "O(N²)");
        assert!(!is_correct(&q, &answers));
    }

    #[test]
    fn sub_question_letters_compare_directly() {
        let mut q = base(5, QuestionKind::Matching);
        q.options = vec!["A. one".into(), "B. two".into()];
        q.sub_questions = vec![sub("first", "B"), sub("second", "A")];
        q.correct_answer = AnswerKey::PerSub(vec!["B".into(), "A".into()]);

        let mut answers = AnswerSet::new();
        answers.set("sub_0", "B");
        answers.set("sub_1", "A");
        assert!(is_correct(&q, &answers));
    }

    #[test]
    fn auto_fill_round_trips_for_all_shapes() {
        for q in [true_false(), ranked(), multi_part()] {
            let filled = fill_correct(&q);
            assert!(is_correct(&q, &filled), "shape {}", q.shape());
        }
    }
}

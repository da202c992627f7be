//! The `examdrill run` command: an interactive terminal session over the
//! bank's visible questions.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use examdrill_core::answers::{normalize, sub_slot, MAIN_SLOT};
use examdrill_core::error::EngineError;
use examdrill_core::letters::{answer_position, position_to_letter};
use examdrill_core::model::{AnswerKey, Question, QuestionKind, Shape};
use examdrill_core::parser;
use examdrill_core::session::{Session, SessionState};
use examdrill_store::{create_store, load_config_from};

pub async fn execute(
    bank_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
    ephemeral: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bank) = bank_path {
        config.bank = bank;
    }
    if let Some(store) = store_path {
        config.store_path = store;
    }

    let bank = parser::parse_bank(&config.bank)?;
    for w in parser::validate_bank(&bank) {
        match w.question_id {
            Some(id) => eprintln!("Warning [{}]: {}", id, w.message),
            None => eprintln!("Warning: {}", w.message),
        }
    }

    let store = create_store(&config, ephemeral);
    let mut session = Session::start(bank, store, config.session_config()).await?;
    tracing::debug!("session started over bank '{}'", session.bank().id);

    println!("{} — type 'help' for commands.\n", session.bank().name);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match session.state() {
            SessionState::Active { id, revealed } => {
                render_question(&session, id, revealed);

                print!("> ");
                io::stdout().flush()?;
                let Some(line) = lines.next().transpose()? else {
                    break;
                };

                match dispatch(&mut session, line.trim()).await? {
                    Flow::Continue => {}
                    Flow::Quit => break,
                }
            }
            SessionState::Results => {
                let tally = session.finish().await?;
                println!("\nPractice complete!");
                println!(
                    "Final score: {}/{} ({}%)",
                    tally.correct,
                    tally.attempted,
                    tally.percentage()
                );

                print!("Type 'restart' to erase saved answers and start over, anything else to quit: ");
                io::stdout().flush()?;
                let Some(line) = lines.next().transpose()? else {
                    break;
                };
                if line.trim() == "restart" {
                    session.restart().await?;
                } else {
                    break;
                }
            }
        }
    }

    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

async fn dispatch(session: &mut Session, input: &str) -> Result<Flow> {
    match input {
        "" => return Ok(Flow::Continue),
        "quit" | "q" => return Ok(Flow::Quit),
        "help" | "?" => {
            print_help();
            return Ok(Flow::Continue);
        }
        "next" | "n" => {
            session.next().await?;
            return Ok(Flow::Continue);
        }
        "prev" | "p" => {
            session.previous().await?;
            return Ok(Flow::Continue);
        }
        "fill" => {
            session.auto_fill().await?;
            println!("Answers filled from the key.");
            return Ok(Flow::Continue);
        }
        "submit" | "s" => {
            match session.submit().await {
                Ok(true) => println!("Correct! Well done."),
                Ok(false) => println!("Let's review the correct answer and explanation."),
                Err(EngineError::IncompleteAnswers(_)) => {
                    println!("Answer every required part before submitting.")
                }
                Err(e) => return Err(e.into()),
            }
            return Ok(Flow::Continue);
        }
        _ => {}
    }

    if let Some(rest) = input
        .strip_prefix("answer ")
        .or_else(|| input.strip_prefix("a "))
    {
        let mut parts = rest.splitn(2, ' ');
        let slot = parts.next().unwrap_or_default();
        let value = parts.next().unwrap_or_default().trim();
        if slot.is_empty() || value.is_empty() {
            println!("Usage: answer <slot> <value>");
        } else {
            session.answer(slot, value).await?;
        }
        return Ok(Flow::Continue);
    }

    // A bare letter answers the main slot of a choice question.
    let bare_letter = session
        .current_question()
        .is_some_and(|q| q.shape() == Shape::Choice)
        && input.len() == 1
        && answer_position(input).is_some();
    if bare_letter {
        session.answer(MAIN_SLOT, input).await?;
    } else {
        println!("Unknown command '{input}' — type 'help' for commands.");
    }

    Ok(Flow::Continue)
}

fn print_help() {
    println!("Commands:");
    println!("  answer <slot> <value>  record an answer (slots: main, sub_0.., part_a/b/c)");
    println!("  <letter>               shorthand for 'answer main <letter>' on choice questions");
    println!("  submit                 reveal and grade the current question");
    println!("  next / prev            move between questions");
    println!("  fill                   auto-fill the correct answers (testing)");
    println!("  quit                   leave the session");
}

fn render_question(session: &Session, id: u32, revealed: bool) {
    let Some(question) = session.current_question() else {
        return;
    };
    let total = session.bank().visible_ids().len();

    println!("\nQuestion {id} of {total}: {}", question.title);
    if !question.content.is_empty() {
        println!("{}", question.content);
    }
    if let Some(code) = &question.code {
        if !code.is_empty() {
            println!("\n{code}\n");
        }
    }

    if question.sub_questions.is_empty() && !question.options.is_empty() {
        for (index, option) in question.options.iter().enumerate() {
            if let Some(letter) = position_to_letter(index) {
                println!("  {letter}. {option}");
            }
        }
    }

    for (index, sub) in question.sub_questions.iter().enumerate() {
        let slot = sub_slot(index);
        let recorded = session.answers().get(&slot).unwrap_or("-");
        println!("  [{slot}] {} (answer: {recorded})", sub.label);
        if !sub.code.is_empty() {
            println!("{}", sub.code);
        }
    }
    if !question.sub_questions.is_empty() && !question.options.is_empty() {
        println!("  Options: {}", question.options.join(", "));
    }

    if question.shape() == Shape::MultiPartFreeText {
        for slot in ["part_a", "part_b", "part_c"] {
            let recorded = session.answers().get(slot).unwrap_or("-");
            println!("  [{slot}] (answer: {recorded})");
        }
    } else if question.sub_questions.is_empty() {
        let recorded = session.answers().get(MAIN_SLOT).unwrap_or("-");
        println!("  [main] (answer: {recorded})");
    }

    if revealed {
        println!("\nCorrect answer:");
        print_key(question, session);
        if !question.explanation.is_empty() {
            println!("\nExplanation:\n{}", question.explanation);
        }
    }
}

fn print_key(question: &Question, session: &Session) {
    match &question.correct_answer {
        AnswerKey::Single(key) => {
            let display = match answer_position(key)
                .and_then(|pos| question.options.get(pos))
            {
                Some(option) if question.shape() == Shape::Choice => {
                    format!("{key}. {option}")
                }
                _ => key.clone(),
            };
            println!("  {display}");
        }
        AnswerKey::PerSub(_) => {
            for (index, sub) in question.sub_questions.iter().enumerate() {
                let verdict = session
                    .answers()
                    .get(&sub_slot(index))
                    .and_then(|raw| normalize(question, raw))
                    .map(|value| {
                        if value == sub.correct_answer {
                            "correct"
                        } else {
                            "incorrect"
                        }
                    })
                    .unwrap_or("unanswered");
                // True/false and ranked keys are already literals; lettered
                // keys display the option they address.
                let display = if question.kind == QuestionKind::TrueFalse
                    || question.shape() != Shape::SubQuestionChoice
                {
                    sub.correct_answer.clone()
                } else {
                    answer_position(&sub.correct_answer)
                        .and_then(|pos| question.options.get(pos))
                        .cloned()
                        .unwrap_or_else(|| sub.correct_answer.clone())
                };
                println!("  {}: {display} ({verdict})", sub.label);
            }
        }
    }
}

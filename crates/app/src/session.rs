use std::io::{BufRead, Write};

use persona_core::completion::CompletionStatus;
use persona_core::model::{AnswerValue, FinalResult, Question};
use services::{AssessmentEngine, EngineError};

use crate::error::CliError;

/// Re-answering a skipped question overwrites it without taking the skip back.
const SKIPS_STAY_COUNTED: &str =
    "Skipped questions still count as skips after you answer them.";

/// How an interactive session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(FinalResult),
    Aborted,
}

#[derive(Debug, PartialEq)]
enum Command {
    Answer(AnswerValue),
    Skip,
    Back,
    Finish,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str, question: &Question) -> Command {
    let input = line.trim();
    match input {
        "s" => return Command::Skip,
        "b" => return Command::Back,
        "f" => return Command::Finish,
        "q" => return Command::Quit,
        "" => return Command::Invalid("enter an answer or a command".to_string()),
        _ => {}
    }

    if question.options.is_empty() {
        return Command::Answer(AnswerValue::from(input));
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=question.options.len()).contains(&n) => {
            Command::Answer(question.options[n - 1].value.clone())
        }
        _ => Command::Invalid(format!(
            "choose an option between 1 and {}",
            question.options.len()
        )),
    }
}

fn render_question(
    engine: &AssessmentEngine,
    question: &Question,
    out: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(
        out,
        "\n[{}/{}] {:.0}%  {}",
        engine.current_index() + 1,
        engine.total_questions(),
        engine.progress(),
        question.text
    )?;
    for (n, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}) {}", n + 1, option.text)?;
    }
    if let Some(answer) = engine.answer(engine.current_index()) {
        match &answer.answer_value {
            Some(value) => writeln!(out, "  (current answer: {value})")?,
            None => writeln!(out, "  (currently skipped)")?,
        }
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Drive a started engine from line-based input until it completes or the
/// user quits. End of input counts as quitting.
///
/// Answering a question that already has an answer overwrites it without
/// counting a new skip.
pub fn run_interactive(
    engine: &mut AssessmentEngine,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<SessionOutcome, CliError> {
    writeln!(
        out,
        "{}: answer with an option number, s = skip, b = back, f = finish, q = quit",
        engine.config().test_name
    )?;

    let mut lines = input.lines();
    loop {
        let Some(question) = engine.current_question().cloned() else {
            return try_finish(engine, &mut out);
        };
        render_question(engine, &question, &mut out)?;

        let Some(line) = lines.next() else {
            return Ok(SessionOutcome::Aborted);
        };
        let index = engine.current_index();
        let advance = match parse_command(&line?, &question) {
            Command::Answer(value) => {
                if engine.answers().contains(index) {
                    engine.update_answer(index, Some(value))?;
                } else {
                    engine.save_answer(index, Some(value))?;
                }
                true
            }
            Command::Skip => {
                engine.skip_question(index)?;
                true
            }
            Command::Back => {
                if !engine.previous_question() {
                    writeln!(out, "Already at the first question.")?;
                }
                false
            }
            Command::Finish => {
                if let outcome @ SessionOutcome::Completed(_) = try_finish(engine, &mut out)? {
                    return Ok(outcome);
                }
                false
            }
            Command::Quit => return Ok(SessionOutcome::Aborted),
            Command::Invalid(message) => {
                writeln!(out, "{message}")?;
                false
            }
        };

        if advance && !engine.next_question() {
            if let outcome @ SessionOutcome::Completed(_) = try_finish(engine, &mut out)? {
                return Ok(outcome);
            }
            writeln!(out, "Revisit questions with b, or quit with q.")?;
        }
    }
}

fn try_finish(
    engine: &mut AssessmentEngine,
    out: &mut impl Write,
) -> Result<SessionOutcome, CliError> {
    match engine.complete() {
        Ok(result) => Ok(SessionOutcome::Completed(result)),
        Err(EngineError::IncompleteSession { status }) => {
            writeln!(out, "Cannot finish yet: {status}.")?;
            if matches!(status, CompletionStatus::TooManySkips { .. }) {
                writeln!(out, "{SKIPS_STAY_COUNTED}")?;
            }
            Ok(SessionOutcome::Aborted)
        }
        Err(err) => Err(err.into()),
    }
}

/// Human-readable summary printed after completion.
pub fn write_summary(
    engine: &AssessmentEngine,
    result: &FinalResult,
    out: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(out)?;
    for (dimension, score) in result.scores.iter() {
        writeln!(out, "  {dimension:<16} {score}")?;
    }
    match &result.result_type {
        Some(result_type) => {
            writeln!(
                out,
                "Result: {result_type} ({}% confidence)",
                result.confidence
            )?;
            writeln!(out, "{}", engine.result_description(result_type.as_str()))?;
            writeln!(out, "\n{}", engine.generate_share_text(result_type.as_str()))?;
        }
        None => writeln!(out, "No result: nothing was scored.")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::model::{AssessmentConfig, QuestionOption, ScoringTable};
    use persona_core::time::fixed_now;
    use services::Clock;

    fn engine() -> AssessmentEngine {
        let questions = (0..3)
            .map(|i| {
                Question::new(format!("q{i}"), format!("Question {i}"))
                    .with_option(QuestionOption::new("x", "Option X"))
                    .with_option(QuestionOption::new("y", "Option Y"))
                    .with_scoring(
                        ScoringTable::new()
                            .with_weight("X", "x", 1.0)
                            .with_weight("Y", "y", 1.0),
                    )
            })
            .collect();
        let config = AssessmentConfig::new("xy", "XY Test", questions)
            .with_min_questions(2)
            .with_skip_threshold(0.4)
            .with_result("X", "All about X.");
        let mut engine = AssessmentEngine::new(config).with_clock(Clock::fixed(fixed_now()));
        engine.start();
        engine
    }

    fn run(engine: &mut AssessmentEngine, script: &str) -> (SessionOutcome, String) {
        let mut out = Vec::new();
        let outcome = run_interactive(engine, script.as_bytes(), &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn answering_every_question_completes() {
        let mut engine = engine();
        let (outcome, _) = run(&mut engine, "1\n2\n1\n");

        let SessionOutcome::Completed(result) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.scores.get("X"), Some(2.0));
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn going_back_overwrites_without_new_skip() {
        let mut engine = engine();
        let (outcome, _) = run(&mut engine, "s\nb\n2\n2\n2\n");

        let SessionOutcome::Completed(result) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.scores.get("Y"), Some(3.0));
        assert_eq!(engine.answers().skipped_count(), 1);
        assert!(!engine.answer(0).unwrap().skipped);
    }

    #[test]
    fn finishing_early_reports_reason() {
        let mut engine = engine();
        let (outcome, output) = run(&mut engine, "1\nf\nq\n");

        assert!(matches!(outcome, SessionOutcome::Aborted));
        assert!(output.contains("Cannot finish yet: 1 of 2 required questions answered."));
    }

    #[test]
    fn too_many_skips_keeps_session_open() {
        let mut engine = engine();
        let (outcome, output) = run(&mut engine, "1\ns\ns\n");

        assert!(matches!(outcome, SessionOutcome::Aborted));
        assert!(output.contains("Revisit questions with b"));
        assert_eq!(engine.answers().skipped_count(), 2);
    }

    #[test]
    fn answering_skipped_questions_keeps_skip_count() {
        let mut engine = engine();
        let (outcome, output) = run(&mut engine, "s\ns\n1\nb\nb\n1\n1\n1\n");

        assert!(matches!(outcome, SessionOutcome::Aborted));
        assert_eq!(engine.answers().answered_count(), 3);
        assert_eq!(engine.answers().skipped_count(), 2);
        assert!(output.contains("Cannot finish yet: skipped 67% of questions, at most 40% allowed."));
        assert!(output.contains(SKIPS_STAY_COUNTED));
    }

    #[test]
    fn invalid_input_is_reported() {
        let mut engine = engine();
        let (_, output) = run(&mut engine, "7\nb\n");

        assert!(output.contains("choose an option between 1 and 2"));
        assert!(output.contains("Already at the first question."));
        assert!(engine.answers().is_empty());
    }

    #[test]
    fn free_text_answers_questions_without_options() {
        let question = Question::new("q", "Rate 1-5");
        assert_eq!(
            parse_command(" 4 ", &question),
            Command::Answer(AnswerValue::from("4"))
        );
    }

    #[test]
    fn summary_includes_share_text() {
        let mut engine = engine();
        let (SessionOutcome::Completed(result), _) = run(&mut engine, "1\n1\n1\n") else {
            panic!("expected completion");
        };
        let mut out = Vec::new();
        write_summary(&engine, &result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Result: X (100% confidence)"));
        assert!(text.contains("My XY Test result is \"X\"! All about X. #xy #TestResult"));
    }
}

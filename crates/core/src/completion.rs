//! Gate deciding whether a session may be finalized.

use std::fmt;

use crate::model::{AnswerSheet, AssessmentConfig};

/// Why a session can or cannot be completed right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionStatus {
    Ready,
    NotEnoughAnswers { answered: usize, required: usize },
    TooManySkips { ratio: f64, threshold: f64 },
}

impl CompletionStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, CompletionStatus::Ready)
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStatus::Ready => write!(f, "ready to complete"),
            CompletionStatus::NotEnoughAnswers { answered, required } => {
                write!(f, "{answered} of {required} required questions answered")
            }
            CompletionStatus::TooManySkips { ratio, threshold } => write!(
                f,
                "skipped {:.0}% of questions, at most {:.0}% allowed",
                ratio * 100.0,
                threshold * 100.0
            ),
        }
    }
}

/// Thresholds a session must meet before it can complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionPolicy {
    pub min_questions: usize,
    pub skip_threshold: f64,
}

impl CompletionPolicy {
    #[must_use]
    pub fn new(min_questions: usize, skip_threshold: f64) -> Self {
        Self {
            min_questions,
            skip_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &AssessmentConfig) -> Self {
        Self::new(config.min_questions, config.skip_question_threshold)
    }

    /// Evaluate the answer sheet against `total_questions`.
    ///
    /// The minimum-answer rule is checked before the skip ratio. A skip ratio
    /// exactly at the threshold passes.
    #[must_use]
    pub fn evaluate(&self, answers: &AnswerSheet, total_questions: usize) -> CompletionStatus {
        let answered = answers.answered_count();
        if answered < self.min_questions {
            return CompletionStatus::NotEnoughAnswers {
                answered,
                required: self.min_questions,
            };
        }

        let skip_ratio = ratio(answers.skipped_count(), total_questions);
        if skip_ratio > self.skip_threshold {
            return CompletionStatus::TooManySkips {
                ratio: skip_ratio,
                threshold: self.skip_threshold,
            };
        }

        CompletionStatus::Ready
    }

    #[must_use]
    pub fn is_complete(&self, answers: &AnswerSheet, total_questions: usize) -> bool {
        self.evaluate(answers, total_questions).is_ready()
    }
}

/// `part / total_questions`, or 0 for an empty question set.
#[must_use]
pub fn ratio(part: usize, total_questions: usize) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = part as f64 / total_questions as f64;
    ratio
}

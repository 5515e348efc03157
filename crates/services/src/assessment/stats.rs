use serde::Serialize;

use persona_core::completion::ratio;
use persona_core::model::{Answer, AnswerSheet, AssessmentConfig, Scores};

/// Read-only summary of the answers recorded so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_questions: usize,
    pub answered_count: usize,
    pub skipped_count: usize,
    pub skip_ratio: f64,
    pub answered_questions: Vec<usize>,
    /// Answered share of the question set, 0–100.
    pub completion_rate: f64,
}

impl Stats {
    #[must_use]
    pub fn collect(answers: &AnswerSheet, total_questions: usize) -> Self {
        let answered_count = answers.answered_count();
        Self {
            total_questions,
            answered_count,
            skipped_count: answers.skipped_count(),
            skip_ratio: ratio(answers.skipped_count(), total_questions),
            answered_questions: answers.answered_indices(),
            completion_rate: ratio(answered_count, total_questions) * 100.0,
        }
    }

    /// `completion_rate` rounded to a whole percentage.
    #[must_use]
    pub fn completion_percent(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = self.completion_rate.round() as u32;
        percent
    }
}

/// Snapshot for offline analysis.
///
/// `result` carries the current scores only while the session satisfies the
/// completion policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub config: AssessmentConfig,
    pub answers: Vec<Answer>,
    pub stats: Stats,
    pub result: Option<Scores>,
}

impl ExportData {
    /// Pretty-printed JSON form.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_counts_and_rates() {
        let mut answers = AnswerSheet::new();
        answers.save_answer(0, Some("a".into()));
        answers.save_answer(2, Some("b".into()));
        answers.skip_question(1);

        let stats = Stats::collect(&answers, 4);
        assert_eq!(stats.total_questions, 4);
        assert_eq!(stats.answered_count, 2);
        assert_eq!(stats.skipped_count, 1);
        assert_eq!(stats.skip_ratio, 0.25);
        assert_eq!(stats.answered_questions, vec![0, 2]);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.completion_percent(), 50);
    }

    #[test]
    fn empty_question_set_has_zero_rates() {
        let stats = Stats::collect(&AnswerSheet::new(), 0);
        assert_eq!(stats.skip_ratio, 0.0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn completion_percent_rounds() {
        let mut answers = AnswerSheet::new();
        answers.save_answer(0, Some("a".into()));

        assert_eq!(Stats::collect(&answers, 3).completion_percent(), 33);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let json = serde_json::to_value(Stats::collect(&AnswerSheet::new(), 2)).unwrap();
        assert_eq!(json["totalQuestions"], 2);
        assert!(json["answeredQuestions"].as_array().unwrap().is_empty());
    }
}

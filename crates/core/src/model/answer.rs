use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::AnswerValue;

/// Recorded response to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_index: usize,
    pub answer_value: Option<AnswerValue>,
    pub skipped: bool,
}

impl Answer {
    /// Builds an answer; `skipped` is derived from the value being absent.
    #[must_use]
    pub fn new(question_index: usize, answer_value: Option<AnswerValue>) -> Self {
        Self {
            question_index,
            skipped: answer_value.is_none(),
            answer_value,
        }
    }

    #[must_use]
    pub fn skipped(question_index: usize) -> Self {
        Self::new(question_index, None)
    }
}

/// Answers of the active session, keyed by question position.
///
/// A question with no entry has never been touched; an entry with
/// `skipped = true` is an explicit skip.
///
/// `skipped_count` is bookkeeping kept alongside the map, not derived from it:
/// - [`AnswerSheet::save_answer`] bumps it when the value is absent,
/// - [`AnswerSheet::skip_question`] always bumps it,
/// - [`AnswerSheet::update_answer`] never touches it.
///
/// Re-answering through `save_answer` therefore double-counts skips, and
/// turning an answer into a skip through `update_answer` does not count it.
/// Callers must pick the operation matching their intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: BTreeMap<usize, Answer>,
    skipped_count: usize,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial answer for a question. An absent value counts as a skip.
    pub fn save_answer(&mut self, index: usize, value: Option<AnswerValue>) {
        if value.is_none() {
            self.skipped_count += 1;
        }
        self.answers.insert(index, Answer::new(index, value));
    }

    /// Overwrites an answer without adjusting `skipped_count`.
    pub fn update_answer(&mut self, index: usize, value: Option<AnswerValue>) {
        self.answers.insert(index, Answer::new(index, value));
    }

    /// Records an explicit skip.
    pub fn skip_question(&mut self, index: usize) {
        self.answers.insert(index, Answer::skipped(index));
        self.skipped_count += 1;
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.answers.get(&index)
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.answers.contains_key(&index)
    }

    /// Answers in ascending question order.
    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }

    /// Non-skipped answers in ascending question order.
    pub fn answered(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values().filter(|a| !a.skipped)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered().count()
    }

    #[must_use]
    pub fn answered_indices(&self) -> Vec<usize> {
        self.answered().map(|a| a.question_index).collect()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Snapshot of all answers in question order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Answer> {
        self.answers.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
        self.skipped_count = 0;
    }
}

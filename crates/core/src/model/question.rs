use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::ids::{AnswerValue, Dimension, QuestionId};

//
// ─── SCORING TABLE ─────────────────────────────────────────────────────────────
//

/// Weights awarded to one dimension, keyed by answer value.
pub type WeightTable = IndexMap<AnswerValue, f64>;

/// Per-dimension weight tables: `dimension -> answer value -> weight`.
///
/// Iteration follows the order the dimensions were written in the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringTable(IndexMap<Dimension, WeightTable>);

impl ScoringTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used by tests and programmatic configs.
    #[must_use]
    pub fn with_weight(
        mut self,
        dimension: impl Into<Dimension>,
        value: impl Into<AnswerValue>,
        weight: f64,
    ) -> Self {
        self.0
            .entry(dimension.into())
            .or_default()
            .insert(value.into(), weight);
        self
    }

    /// Weight for `value` in `dimension`; a value without an entry weighs 0.
    #[must_use]
    pub fn weight(&self, dimension: &str, value: &str) -> f64 {
        self.0
            .get(dimension)
            .and_then(|weights| weights.get(value))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.0.keys()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds entries from `other` that are not already present.
    fn extend_missing(&mut self, other: &ScoringTable) {
        for (dimension, weights) in &other.0 {
            let target = self.0.entry(dimension.clone()).or_default();
            for (value, weight) in weights {
                target.entry(value.clone()).or_insert(*weight);
            }
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One selectable answer choice of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: AnswerValue,
    pub text: String,
    #[serde(default, skip_serializing_if = "ScoringTable::is_empty")]
    pub scoring: ScoringTable,
}

impl QuestionOption {
    #[must_use]
    pub fn new(value: impl Into<AnswerValue>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            scoring: ScoringTable::default(),
        }
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// Question-level weights. Option tables are folded in by [`Question::scoring_rule`].
    #[serde(default, skip_serializing_if = "ScoringTable::is_empty")]
    pub scoring: ScoringTable,
}

impl Question {
    #[must_use]
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options: Vec::new(),
            scoring: ScoringTable::default(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, option: QuestionOption) -> Self {
        self.options.push(option);
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }

    /// Effective scoring rule: the question-level table extended with every
    /// option's table. Question-level entries win on conflict.
    #[must_use]
    pub fn scoring_rule(&self) -> ScoringTable {
        let mut rule = self.scoring.clone();
        for option in &self.options {
            rule.extend_missing(&option.scoring);
        }
        rule
    }

    /// Finds the option carrying `value`, if any.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.value.as_str() == value)
    }
}

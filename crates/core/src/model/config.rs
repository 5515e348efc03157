use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::model::ids::Dimension;
use crate::model::question::Question;

/// Answered questions required before a session may complete, unless configured.
pub const DEFAULT_MIN_QUESTIONS: usize = 5;

/// Skip ratio above which a session is rejected, unless configured.
pub const DEFAULT_SKIP_THRESHOLD: f64 = 0.3;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read assessment config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read assessment config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed assessment config: {0}")]
    Parse(#[from] serde_json::Error),
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Immutable description of one assessment.
///
/// Content is taken as-is: the loader only checks JSON shape, schema
/// validation happens before the file reaches us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentConfig {
    pub test_id: String,
    pub test_name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Description text per result dimension.
    #[serde(default)]
    pub results: IndexMap<Dimension, String>,
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    #[serde(default = "default_skip_threshold")]
    pub skip_question_threshold: f64,
}

fn default_min_questions() -> usize {
    DEFAULT_MIN_QUESTIONS
}

fn default_skip_threshold() -> f64 {
    DEFAULT_SKIP_THRESHOLD
}

impl AssessmentConfig {
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        test_name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            test_name: test_name.into(),
            questions,
            results: IndexMap::new(),
            min_questions: DEFAULT_MIN_QUESTIONS,
            skip_question_threshold: DEFAULT_SKIP_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_min_questions(mut self, min_questions: usize) -> Self {
        self.min_questions = min_questions;
        self
    }

    #[must_use]
    pub fn with_skip_threshold(mut self, threshold: f64) -> Self {
        self.skip_question_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_result(
        mut self,
        dimension: impl Into<Dimension>,
        description: impl Into<String>,
    ) -> Self {
        self.results.insert(dimension.into(), description.into());
        self
    }

    /// Parse a config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the JSON does not match the config shape.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a config from any reader.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` on read failures and `ConfigError::Parse` on bad JSON.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, ConfigError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    /// Load a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if its contents are not a valid config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Dimensions in canonical order: first appearance across the question set.
    ///
    /// Result descriptions for dimensions no question scores are appended last.
    #[must_use]
    pub fn dimension_order(&self) -> IndexSet<Dimension> {
        let mut order = IndexSet::new();
        for question in &self.questions {
            order.extend(question.scoring_rule().dimensions().cloned());
        }
        order.extend(self.results.keys().cloned());
        order
    }
}

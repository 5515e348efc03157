use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::answer::Answer;
use crate::model::ids::Dimension;

/// Accumulated points per dimension, iterated in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scores(IndexMap<Dimension, f64>);

impl Scores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `points` to `dimension`, creating the entry at 0 first.
    pub fn add(&mut self, dimension: &Dimension, points: f64) {
        *self.0.entry(dimension.clone()).or_insert(0.0) += points;
    }

    #[must_use]
    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dimension, f64)> {
        self.0.iter().map(|(d, s)| (d, *s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reorders entries by `rank`; dimensions without a rank go last.
    pub(crate) fn sort_by_rank(&mut self, rank: impl Fn(&Dimension) -> Option<usize>) {
        self.0.sort_by(|a, _, b, _| {
            let a = rank(a).unwrap_or(usize::MAX);
            let b = rank(b).unwrap_or(usize::MAX);
            a.cmp(&b)
        });
    }
}

impl<D: Into<Dimension>> FromIterator<(D, f64)> for Scores {
    fn from_iter<I: IntoIterator<Item = (D, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(d, s)| (d.into(), s)).collect())
    }
}

/// Winning dimension and how clearly it won.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub result_type: Option<Dimension>,
    pub confidence: u32,
}

/// Terminal snapshot produced by a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub test_id: String,
    pub test_name: String,
    pub answers: Vec<Answer>,
    pub scores: Scores,
    pub result_type: Option<Dimension>,
    pub confidence: u32,
    pub completed_at: DateTime<Utc>,
}

//! Score aggregation and result resolution.

use crate::model::{AnswerSheet, AssessmentConfig, Dimension, Resolution, Scores};

/// Confidence reported when fewer than two dimensions were scored.
pub const UNCONTESTED_CONFIDENCE: u32 = 100;

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Sum the weights of every non-skipped answer, per dimension.
///
/// Answers are visited in question order and the resulting dimensions are
/// arranged in the config's canonical order, so sums and tie-breaks are
/// reproducible. Only dimensions touched by an answered question appear.
/// Answers pointing past the end of the question set are ignored.
#[must_use]
pub fn calculate_scores(config: &AssessmentConfig, answers: &AnswerSheet) -> Scores {
    let mut scores = Scores::new();

    for answer in answers.answered() {
        let Some(question) = config.questions.get(answer.question_index) else {
            continue;
        };
        let value = answer
            .answer_value
            .as_ref()
            .map_or("", |value| value.as_str());

        let rule = question.scoring_rule();
        for dimension in rule.dimensions() {
            scores.add(dimension, rule.weight(dimension.as_str(), value));
        }
    }

    let order = config.dimension_order();
    scores.sort_by_rank(|dimension| order.get_index_of(dimension));
    scores
}

//
// ─── RESOLUTION ────────────────────────────────────────────────────────────────
//

/// Pick the dimension with the strictly greatest score.
///
/// Ties keep the dimension that comes first in `scores`. Empty scores
/// resolve to no result type.
#[must_use]
pub fn determine_result(scores: &Scores) -> Resolution {
    let mut best: Option<(&Dimension, f64)> = None;
    for (dimension, score) in scores.iter() {
        match best {
            Some((_, max)) if score <= max => {}
            _ => best = Some((dimension, score)),
        }
    }

    Resolution {
        result_type: best.map(|(dimension, _)| dimension.clone()),
        confidence: calculate_confidence(scores),
    }
}

/// Margin between the two best scores as a percentage of the best one.
///
/// - fewer than two dimensions: [`UNCONTESTED_CONFIDENCE`]
/// - best score of zero or below: 0
///
/// A negative runner-up pushes the value above 100. It is not clamped to
/// 100, only to `u32::MAX`.
#[must_use]
pub fn calculate_confidence(scores: &Scores) -> u32 {
    let mut sorted: Vec<f64> = scores.iter().map(|(_, score)| score).collect();
    if sorted.len() < 2 {
        return UNCONTESTED_CONFIDENCE;
    }
    sorted.sort_by(|a, b| b.total_cmp(a));

    let (top, runner_up) = (sorted[0], sorted[1]);
    if top <= 0.0 {
        return 0;
    }

    // Sorted descending, so top >= runner_up and the ratio is non-negative.
    let percent = (100.0 * (top - runner_up) / top).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = percent.min(f64::from(u32::MAX)) as u32;
    confidence
}

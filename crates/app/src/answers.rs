use persona_core::model::AnswerValue;

use crate::error::CliError;

/// Marker for a skipped question in `--answers`.
pub const SKIP_MARKER: &str = "-";

/// Parse a comma-separated answer list, one entry per question in order.
///
/// `-` and blank entries are skips.
pub fn parse_answers(raw: &str) -> Result<Vec<Option<AnswerValue>>, CliError> {
    if raw.trim().is_empty() {
        return Err(CliError::EmptyAnswers);
    }
    Ok(raw
        .split(',')
        .map(str::trim)
        .map(|entry| {
            if entry.is_empty() || entry == SKIP_MARKER {
                None
            } else {
                Some(AnswerValue::from(entry))
            }
        })
        .collect())
}

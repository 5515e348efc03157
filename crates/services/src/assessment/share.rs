use persona_core::model::AssessmentConfig;

/// Shown when the config has no description for a result type.
pub const MISSING_DESCRIPTION: &str = "No description available for this result.";

/// Description configured for `result_type`, or [`MISSING_DESCRIPTION`].
#[must_use]
pub fn result_description<'a>(config: &'a AssessmentConfig, result_type: &str) -> &'a str {
    config
        .results
        .get(result_type)
        .map_or(MISSING_DESCRIPTION, String::as_str)
}

/// Plain-text share message for a result.
///
/// Nothing is escaped. Sanitize before embedding the text in HTML.
#[must_use]
pub fn share_text(config: &AssessmentConfig, result_type: &str) -> String {
    let description = result_description(config, result_type);
    format!(
        "My {} result is \"{result_type}\"! {description} #{} #TestResult",
        config.test_name, config.test_id
    )
}

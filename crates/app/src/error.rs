use std::io;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] persona_core::Error),
    #[error(transparent)]
    Engine(#[from] services::EngineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("answer list is empty")]
    EmptyAnswers,
}

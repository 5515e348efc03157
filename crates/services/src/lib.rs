#![forbid(unsafe_code)]

pub mod assessment;
pub mod error;

pub use persona_core::Clock;

pub use error::{EngineError, UnknownEventError};

pub use assessment::{
    AssessmentEngine, EngineEvent, EventNotifier, EventPayload, ExportData, ProgressUpdate,
    SessionState, Stats,
};

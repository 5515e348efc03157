mod engine;
mod events;
mod navigator;
mod share;
mod stats;

pub use engine::{AssessmentEngine, SessionState};
pub use events::{EngineEvent, EventNotifier, EventPayload, ProgressUpdate};
pub use navigator::Navigator;
pub use share::{MISSING_DESCRIPTION, result_description, share_text};
pub use stats::{ExportData, Stats};

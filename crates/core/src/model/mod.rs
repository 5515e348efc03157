mod answer;
mod config;
mod ids;
mod outcome;
mod question;

pub use answer::{Answer, AnswerSheet};
pub use config::{AssessmentConfig, ConfigError, DEFAULT_MIN_QUESTIONS, DEFAULT_SKIP_THRESHOLD};
pub use ids::{AnswerValue, Dimension, QuestionId};
pub use outcome::{FinalResult, Resolution, Scores};
pub use question::{Question, QuestionOption, ScoringTable, WeightTable};

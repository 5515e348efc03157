use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use persona_core::completion::{CompletionPolicy, CompletionStatus};
use persona_core::model::{
    Answer, AnswerSheet, AnswerValue, AssessmentConfig, FinalResult, Question, Resolution, Scores,
};
use persona_core::scoring;
use persona_core::time::Clock;

use super::events::{EngineEvent, EventNotifier, EventPayload, ProgressUpdate};
use super::navigator::Navigator;
use super::share;
use super::stats::{ExportData, Stats};
use crate::error::EngineError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of the engine's single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    InProgress,
    Completed,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Runs one assessment session over an owned config.
///
/// Everything is synchronous and in-memory; one engine holds exactly one
/// session at a time. `start` may be called again at any point to begin over.
pub struct AssessmentEngine {
    config: AssessmentConfig,
    policy: CompletionPolicy,
    clock: Clock,
    rng: StdRng,
    events: EventNotifier,
    navigator: Navigator,
    answers: AnswerSheet,
    state: SessionState,
    result: Option<FinalResult>,
}

impl AssessmentEngine {
    /// Create an engine using the system clock and an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: AssessmentConfig) -> Self {
        let policy = CompletionPolicy::from_config(&config);
        let navigator = Navigator::new(config.question_count());
        Self {
            config,
            policy,
            clock: Clock::default(),
            rng: StdRng::from_rng(&mut rand::rng()),
            events: EventNotifier::new(),
            navigator,
            answers: AnswerSheet::new(),
            state: SessionState::Created,
            result: None,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Use a seeded RNG so shuffles are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.config.question_count()
    }

    // ─── Events ────────────────────────────────────────────────────────────────

    /// Register a lifecycle handler by name (`start`, `progress`, `complete`).
    ///
    /// A later registration for the same event replaces the earlier one.
    /// Unknown names are logged and ignored; the return value says whether the
    /// handler was installed.
    pub fn on(&mut self, event: &str, handler: impl FnMut(&EventPayload<'_>) + 'static) -> bool {
        self.events.on(event, handler)
    }

    /// Typed variant of [`AssessmentEngine::on`].
    pub fn on_event(
        &mut self,
        event: EngineEvent,
        handler: impl FnMut(&EventPayload<'_>) + 'static,
    ) {
        self.events.set(event, handler);
    }

    // ─── Lifecycle ─────────────────────────────────────────────────────────────

    /// Reset all session state and enter `InProgress`, from any state.
    pub fn start(&mut self) {
        self.navigator = Navigator::new(self.total_questions());
        self.answers.clear();
        self.result = None;
        self.state = SessionState::InProgress;
        debug!(
            test_id = %self.config.test_id,
            questions = self.total_questions(),
            "assessment started"
        );
        self.events.emit(&EventPayload::Start);
    }

    /// Finalize the session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::IncompleteSession` if the completion policy is not
    /// met. The session is left untouched so the caller can collect more
    /// answers and retry.
    pub fn complete(&mut self) -> Result<FinalResult, EngineError> {
        let status = self.completion_status();
        if !status.is_ready() {
            debug!(test_id = %self.config.test_id, %status, "completion rejected");
            return Err(EngineError::IncompleteSession { status });
        }

        let scores = self.calculate_scores();
        let resolution = scoring::determine_result(&scores);
        let result = FinalResult {
            test_id: self.config.test_id.clone(),
            test_name: self.config.test_name.clone(),
            answers: self.answers.to_vec(),
            scores,
            result_type: resolution.result_type,
            confidence: resolution.confidence,
            completed_at: self.clock.now(),
        };

        self.state = SessionState::Completed;
        info!(
            test_id = %result.test_id,
            result_type = ?result.result_type,
            confidence = result.confidence,
            "assessment completed"
        );
        self.events.emit(&EventPayload::Complete(&result));
        self.result = Some(result.clone());
        Ok(result)
    }

    /// Result of the last successful completion since `start`.
    #[must_use]
    pub fn result(&self) -> Option<&FinalResult> {
        self.result.as_ref()
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    /// Question at the current position; `None` for an empty question set.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.config.questions.get(self.navigator.current())
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    /// Percentage of the question set reached: `100 * (index + 1) / total`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.navigator.progress()
    }

    /// Move to the next question. Returns `false` on the last one.
    pub fn next_question(&mut self) -> bool {
        let moved = self.navigator.next();
        if moved {
            self.notify_progress();
        }
        moved
    }

    /// Move to the previous question. Returns `false` on the first one.
    pub fn previous_question(&mut self) -> bool {
        let moved = self.navigator.previous();
        if moved {
            self.notify_progress();
        }
        moved
    }

    fn notify_progress(&mut self) {
        let update = ProgressUpdate {
            current_index: self.navigator.current(),
            total: self.navigator.total(),
            progress: self.navigator.progress(),
        };
        debug!(index = update.current_index, progress = update.progress, "moved");
        self.events.emit(&EventPayload::Progress(&update));
    }

    // ─── Answers ───────────────────────────────────────────────────────────────
    //
    // `save_answer` counts an absent value as a skip, `update_answer` never
    // adjusts the skip counter, `skip_question` always does. See `AnswerSheet`.

    /// Record the first answer for a question; `None` counts as a skip.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::QuestionOutOfRange` for an index past the question set.
    pub fn save_answer(
        &mut self,
        index: usize,
        value: Option<AnswerValue>,
    ) -> Result<(), EngineError> {
        self.check_index(index)?;
        debug!(index, value = ?value, "answer saved");
        self.answers.save_answer(index, value);
        Ok(())
    }

    /// Overwrite an answer without touching the skip counter.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::QuestionOutOfRange` for an index past the question set.
    pub fn update_answer(
        &mut self,
        index: usize,
        value: Option<AnswerValue>,
    ) -> Result<(), EngineError> {
        self.check_index(index)?;
        debug!(index, value = ?value, "answer updated");
        self.answers.update_answer(index, value);
        Ok(())
    }

    /// Record an explicit skip.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::QuestionOutOfRange` for an index past the question set.
    pub fn skip_question(&mut self, index: usize) -> Result<(), EngineError> {
        self.check_index(index)?;
        debug!(index, "question skipped");
        self.answers.skip_question(index);
        Ok(())
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    fn check_index(&self, index: usize) -> Result<(), EngineError> {
        let total = self.total_questions();
        if index < total {
            Ok(())
        } else {
            Err(EngineError::QuestionOutOfRange { index, total })
        }
    }

    // ─── Completion & scoring ──────────────────────────────────────────────────

    #[must_use]
    pub fn completion_status(&self) -> CompletionStatus {
        self.policy.evaluate(&self.answers, self.total_questions())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completion_status().is_ready()
    }

    #[must_use]
    pub fn calculate_scores(&self) -> Scores {
        scoring::calculate_scores(&self.config, &self.answers)
    }

    #[must_use]
    pub fn determine_result(&self, scores: &Scores) -> Resolution {
        scoring::determine_result(scores)
    }

    #[must_use]
    pub fn calculate_confidence(&self, scores: &Scores) -> u32 {
        scoring::calculate_confidence(scores)
    }

    // ─── Utilities ─────────────────────────────────────────────────────────────

    /// Shuffle the question order and return to the first question.
    ///
    /// Recorded answers keep their indices, so shuffling after answering
    /// detaches them from the questions they were given for.
    pub fn shuffle_questions(&mut self) {
        if !self.answers.is_empty() {
            warn!(
                answers = self.answers.len(),
                "shuffling questions after answers were recorded"
            );
        }
        self.config.questions.shuffle(&mut self.rng);
        self.navigator.reset();
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats::collect(&self.answers, self.total_questions())
    }

    /// Snapshot of config, answers and stats, plus scores when completable.
    #[must_use]
    pub fn export_data(&self) -> ExportData {
        ExportData {
            config: self.config.clone(),
            answers: self.answers.to_vec(),
            stats: self.stats(),
            result: self.is_complete().then(|| self.calculate_scores()),
        }
    }

    /// JSON form of [`AssessmentEngine::export_data`].
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Export` if serialization fails.
    pub fn export_json(&self) -> Result<String, EngineError> {
        Ok(self.export_data().to_json()?)
    }

    #[must_use]
    pub fn result_description(&self, result_type: &str) -> &str {
        share::result_description(&self.config, result_type)
    }

    #[must_use]
    pub fn generate_share_text(&self, result_type: &str) -> String {
        share::share_text(&self.config, result_type)
    }
}

impl fmt::Debug for AssessmentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentEngine")
            .field("test_id", &self.config.test_id)
            .field("questions_len", &self.config.questions.len())
            .field("state", &self.state)
            .field("current", &self.navigator.current())
            .field("answers_len", &self.answers.len())
            .field("skipped_count", &self.answers.skipped_count())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::model::{Dimension, ScoringTable};
    use persona_core::time::fixed_now;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn build_config(questions: usize) -> AssessmentConfig {
        let questions = (0..questions)
            .map(|i| {
                Question::new(format!("q{i}").as_str(), format!("Question {i}")).with_scoring(
                    ScoringTable::new()
                        .with_weight("A", "a", 1.0)
                        .with_weight("B", "b", 1.0),
                )
            })
            .collect();
        AssessmentConfig::new("t", "Test", questions)
            .with_min_questions(5)
            .with_skip_threshold(0.3)
            .with_result("A", "Type A")
    }

    fn build_engine(questions: usize) -> AssessmentEngine {
        let mut engine = AssessmentEngine::new(build_config(questions))
            .with_clock(Clock::fixed(fixed_now()))
            .with_seed(7);
        engine.start();
        engine
    }

    #[test]
    fn start_enters_in_progress_and_resets() {
        let mut engine = AssessmentEngine::new(build_config(3));
        assert_eq!(engine.state(), SessionState::Created);

        engine.start();
        engine.save_answer(0, Some("a".into())).unwrap();
        engine.next_question();
        engine.start();

        assert_eq!(engine.state(), SessionState::InProgress);
        assert_eq!(engine.current_index(), 0);
        assert!(engine.answers().is_empty());
        assert_eq!(engine.answers().skipped_count(), 0);
    }

    #[test]
    fn navigation_updates_progress() {
        let mut engine = build_engine(4);
        assert_eq!(engine.progress(), 25.0);
        assert!(engine.next_question());
        assert_eq!(engine.progress(), 50.0);
        assert!(engine.previous_question());
        assert!(!engine.previous_question());
        assert_eq!(engine.current_question().unwrap().id.as_str(), "q0");
    }

    #[test]
    fn current_question_is_none_for_empty_set() {
        let engine = build_engine(0);
        assert!(engine.current_question().is_none());
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn out_of_range_answers_are_rejected() {
        let mut engine = build_engine(2);
        let err = engine.save_answer(2, Some("a".into())).unwrap_err();
        assert!(matches!(err, EngineError::QuestionOutOfRange { index: 2, total: 2 }));
        assert!(engine.skip_question(5).is_err());
        assert!(engine.update_answer(9, None).is_err());
        assert!(engine.answers().is_empty());
    }

    #[test]
    fn complete_fails_until_policy_met() {
        let mut engine = build_engine(10);
        for i in 0..4 {
            engine.save_answer(i, Some("a".into())).unwrap();
        }
        let err = engine.complete().unwrap_err();
        assert!(matches!(
            err,
            EngineError::IncompleteSession {
                status: CompletionStatus::NotEnoughAnswers { answered: 4, required: 5 }
            }
        ));
        assert_eq!(engine.state(), SessionState::InProgress);

        engine.save_answer(4, Some("b".into())).unwrap();
        let result = engine.complete().unwrap();
        assert_eq!(engine.state(), SessionState::Completed);
        assert_eq!(result.result_type, Some(Dimension::from("A")));
        assert_eq!(result.scores.get("A"), Some(4.0));
        assert_eq!(result.scores.get("B"), Some(1.0));
        assert_eq!(result.confidence, 75);
        assert_eq!(result.completed_at, fixed_now());
        assert_eq!(engine.result(), Some(&result));
    }

    #[test]
    fn seven_answered_three_skipped_is_complete() {
        let mut engine = build_engine(10);
        for i in 0..7 {
            engine.save_answer(i, Some("a".into())).unwrap();
        }
        for i in 7..10 {
            engine.skip_question(i).unwrap();
        }

        assert_eq!(engine.stats().skip_ratio, 0.3);
        assert!(engine.is_complete());
    }

    #[test]
    fn update_answer_does_not_count_new_skip() {
        let mut engine = build_engine(10);
        for i in 0..8 {
            engine.save_answer(i, Some("a".into())).unwrap();
        }
        engine.save_answer(8, None).unwrap();
        engine.save_answer(9, None).unwrap();
        assert_eq!(engine.answers().skipped_count(), 2);

        engine.update_answer(7, None).unwrap();
        assert!(engine.answer(7).unwrap().skipped);
        assert_eq!(engine.answers().answered_count(), 7);
        assert_eq!(engine.answers().skipped_count(), 2);

        // Re-recording the same skip via save_answer counts it.
        engine.save_answer(7, None).unwrap();
        assert_eq!(engine.answers().skipped_count(), 3);
        assert!(engine.is_complete());

        engine.save_answer(6, None).unwrap();
        assert_eq!(engine.answers().skipped_count(), 4);
        assert!(!engine.is_complete());
    }

    #[test]
    fn handlers_receive_lifecycle_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = AssessmentEngine::new(build_config(5))
            .with_clock(Clock::fixed(fixed_now()))
            .with_seed(1);
        engine.with_min_questions_for_test(1);

        let sink = Rc::clone(&log);
        assert!(engine.on("start", move |_| sink.borrow_mut().push("start".to_string())));
        let sink = Rc::clone(&log);
        engine.on("progress", move |payload| {
            if let EventPayload::Progress(update) = payload {
                sink.borrow_mut().push(format!("progress {}", update.progress));
            }
        });
        let sink = Rc::clone(&log);
        engine.on_event(EngineEvent::Complete, move |payload| {
            if let EventPayload::Complete(result) = payload {
                sink.borrow_mut().push(format!("complete {:?}", result.result_type));
            }
        });
        assert!(!engine.on("finished", |_| {}));

        engine.start();
        engine.save_answer(0, Some("b".into())).unwrap();
        assert!(engine.next_question());
        assert!(engine.previous_question());
        assert!(!engine.previous_question());
        for _ in 0..4 {
            assert!(engine.next_question());
        }
        assert!(!engine.next_question());
        engine.complete().unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "start".to_string(),
                "progress 40".to_string(),
                "progress 20".to_string(),
                "progress 40".to_string(),
                "progress 60".to_string(),
                "progress 80".to_string(),
                "progress 100".to_string(),
                "complete Some(Dimension(B))".to_string(),
            ]
        );
    }

    #[test]
    fn failed_completion_does_not_fire_handler() {
        let fired = Rc::new(RefCell::new(false));
        let mut engine = build_engine(10);
        let flag = Rc::clone(&fired);
        engine.on("complete", move |_| *flag.borrow_mut() = true);

        assert!(engine.complete().is_err());
        assert!(!*fired.borrow());
    }

    #[test]
    fn seeded_shuffle_is_reproducible_permutation() {
        let mut first = build_engine(12);
        let mut second = build_engine(12);
        first.next_question();
        first.shuffle_questions();
        second.shuffle_questions();

        let ids = |engine: &AssessmentEngine| {
            engine
                .config()
                .questions
                .iter()
                .map(|q| q.id.as_str().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.current_index(), 0);

        let mut sorted = ids(&first);
        sorted.sort();
        let mut expected: Vec<_> = (0..12).map(|i| format!("q{i}")).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn export_includes_scores_only_when_completable() {
        let mut engine = build_engine(6);
        engine.save_answer(0, Some("a".into())).unwrap();
        assert!(engine.export_data().result.is_none());

        for i in 1..5 {
            engine.save_answer(i, Some("b".into())).unwrap();
        }
        let export = engine.export_data();
        let scores = export.result.expect("scores once completable");
        assert_eq!(scores.get("B"), Some(4.0));
        assert_eq!(export.stats.answered_count, 5);

        let json: serde_json::Value =
            serde_json::from_str(&engine.export_json().unwrap()).unwrap();
        assert_eq!(json["config"]["testId"], "t");
        assert_eq!(json["result"]["A"], 1.0);
    }

    #[test]
    fn share_text_uses_config() {
        let engine = build_engine(1);
        assert_eq!(engine.result_description("A"), "Type A");
        assert_eq!(
            engine.generate_share_text("A"),
            "My Test result is \"A\"! Type A #t #TestResult"
        );
    }

    impl AssessmentEngine {
        fn with_min_questions_for_test(&mut self, min_questions: usize) {
            self.config.min_questions = min_questions;
            self.policy = CompletionPolicy::from_config(&self.config);
        }
    }
}

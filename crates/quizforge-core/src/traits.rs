//! Seams between the engine and the outside world.
//!
//! Question banks come in through [`QuestionSource`]; finished attempts go
//! out through [`AttemptSink`]. Implementations live in `parser` and `sink`.

use async_trait::async_trait;

use crate::model::QuizSet;
use crate::report::AttemptReport;

/// Somewhere question banks can be loaded from.
pub trait QuestionSource: Send + Sync {
    /// Human-readable source description (e.g. a file path).
    fn describe(&self) -> String;

    /// Load the quiz set.
    fn load_questions(&self) -> anyhow::Result<QuizSet>;
}

/// Destination for completed attempts.
///
/// Saves run off the session's critical path: a failing sink is logged and
/// never changes the attempt's outcome.
#[async_trait]
pub trait AttemptSink: Send + Sync {
    /// Human-readable sink name (e.g. "json-dir").
    fn name(&self) -> &str;

    /// Persist one attempt.
    async fn save_attempt(&self, report: &AttemptReport) -> anyhow::Result<()>;
}

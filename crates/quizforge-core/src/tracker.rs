//! Answer ledger and pending selections.
//!
//! The ledger is append-only: one record per question, never rewritten.
//! Pending selections are scratch state for the question on screen and may
//! change freely until they are committed.

use std::collections::HashMap;

use crate::error::QuizError;
use crate::model::{AnswerRecord, ChosenValue};

/// Uncommitted state for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelection {
    pub value: Option<String>,
    pub hint_used: bool,
}

/// Ledger of committed answers plus pending selections, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct AttemptTracker {
    ledger: Vec<AnswerRecord>,
    pending: HashMap<String, PendingSelection>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for `question_id`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DuplicateAnswer` if the question is already in the
    /// ledger. The ledger is left untouched.
    ///
    /// # Panics
    ///
    /// In debug builds, on a duplicate record.
    pub fn record(
        &mut self,
        question_id: &str,
        chosen: ChosenValue,
        is_correct: bool,
        time_spent_secs: u32,
        hint_used: bool,
    ) -> Result<&AnswerRecord, QuizError> {
        debug_assert!(
            !self.contains(question_id),
            "question {question_id} recorded twice"
        );
        self.ensure_uncommitted(question_id)?;

        self.pending.remove(question_id);
        let index = self.ledger.len();
        self.ledger.push(AnswerRecord {
            question_id: question_id.to_string(),
            is_correct: is_correct && !chosen.is_skipped(),
            chosen,
            time_spent_secs,
            hint_used,
        });
        Ok(&self.ledger[index])
    }

    /// Replace the pending choice for `question_id`.
    pub fn select(&mut self, question_id: &str, value: impl Into<String>) -> Result<(), QuizError> {
        self.ensure_uncommitted(question_id)?;
        self.pending.entry(question_id.to_string()).or_default().value = Some(value.into());
        Ok(())
    }

    /// Flag that a hint was shown for `question_id`. Carried onto the record
    /// when the question is committed.
    pub fn mark_hint(&mut self, question_id: &str) -> Result<(), QuizError> {
        self.ensure_uncommitted(question_id)?;
        self.pending.entry(question_id.to_string()).or_default().hint_used = true;
        Ok(())
    }

    pub fn pending_selection(&self, question_id: &str) -> Option<&PendingSelection> {
        self.pending.get(question_id)
    }

    pub fn hint_used(&self, question_id: &str) -> bool {
        self.pending
            .get(question_id)
            .is_some_and(|pending| pending.hint_used)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.ledger.iter().any(|r| r.question_id == question_id)
    }

    pub fn ledger(&self) -> &[AnswerRecord] {
        &self.ledger
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    fn ensure_uncommitted(&self, question_id: &str) -> Result<(), QuizError> {
        if self.contains(question_id) {
            tracing::error!(question_id, "question already committed to the ledger");
            return Err(QuizError::DuplicateAnswer {
                question_id: question_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_insertion_order() {
        let mut tracker = AttemptTracker::new();
        tracker
            .record("a", ChosenValue::Answer("x".into()), true, 4, false)
            .unwrap();
        tracker.record("b", ChosenValue::Skipped, false, 2, false).unwrap();

        let ids: Vec<&str> = tracker.ledger().iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "recorded twice"))]
    fn duplicate_record_is_rejected_without_change() {
        let mut tracker = AttemptTracker::new();
        tracker
            .record("a", ChosenValue::Answer("x".into()), true, 1, false)
            .unwrap();

        let err = tracker
            .record("a", ChosenValue::Answer("y".into()), false, 9, true)
            .unwrap_err();
        assert!(err.is_programming_error());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.ledger()[0].chosen, ChosenValue::Answer("x".into()));
    }

    #[test]
    fn skipped_is_never_correct() {
        let mut tracker = AttemptTracker::new();
        let record = tracker.record("a", ChosenValue::Skipped, true, 0, false).unwrap();
        assert!(!record.is_correct);
    }

    #[test]
    fn pending_selection_can_change_until_commit() {
        let mut tracker = AttemptTracker::new();
        tracker.select("a", "first").unwrap();
        tracker.select("a", "second").unwrap();
        tracker.mark_hint("a").unwrap();

        let pending = tracker.pending_selection("a").unwrap();
        assert_eq!(pending.value.as_deref(), Some("second"));
        assert!(pending.hint_used);

        tracker
            .record("a", ChosenValue::Answer("second".into()), true, 3, true)
            .unwrap();
        assert!(tracker.pending_selection("a").is_none());
        assert!(tracker.select("a", "third").is_err());
        assert!(tracker.mark_hint("a").is_err());
    }
}

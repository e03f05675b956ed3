//! Engine error types.
//!
//! Every state-changing session operation validates before it mutates, so an
//! `Err` from any of them leaves the session exactly as it was.

use thiserror::Error;

use crate::model::Status;
use crate::session::EventKind;

/// Errors raised by the assessment engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// The pool holds fewer usable questions than the session asks for.
    #[error("question pool too small: requested {requested}, only {available} usable")]
    InsufficientPool { requested: usize, available: usize },

    /// The event is not valid in the current session state.
    #[error("cannot {event} while session is {status}")]
    InvalidTransition { event: EventKind, status: Status },

    /// A question already in the ledger was recorded a second time.
    #[error("question {question_id} already has a committed answer")]
    DuplicateAnswer { question_id: String },

    /// Session duration must be a positive number of seconds.
    #[error("session duration must be positive, got {0}s")]
    InvalidDuration(i64),

    /// Session sample size must be at least one question.
    #[error("sample size must be at least 1")]
    InvalidSampleSize,

    /// The event names a question that is not the one currently shown.
    #[error("question {actual} is not current (expected {expected})")]
    QuestionMismatch { expected: String, actual: String },

    /// `submit_selection` was called without a pending choice.
    #[error("no answer selected for question {question_id}")]
    NoSelection { question_id: String },

    /// The question id is not part of this session.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// Results only exist once the attempt has completed.
    #[error("no result available while session is {status}")]
    ResultUnavailable { status: Status },
}

impl QuizError {
    /// Returns `true` for errors that indicate a bug in the caller or engine
    /// rather than a user action arriving at the wrong moment.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, QuizError::DuplicateAnswer { .. })
    }

    /// Returns `true` if the error was a rejected state transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, QuizError::InvalidTransition { .. })
    }
}

//! The session state machine.
//!
//! ```text
//! Idle ──start──▶ Active ──last answer / expiry──▶ Completed ──enter_review──▶ Review
//!                   ▲                                  │                        │
//!                   └──────────────restart─────────────┴────────────────────────┘
//! ```
//!
//! A [`Session`] is an owned value; every operation goes through
//! [`Session::dispatch`], which checks the event against the current state
//! before touching anything. A rejected event returns an error and leaves the
//! session unchanged. The attempt result is computed once, on the transition
//! into `Completed`, and only read afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::bank::{sample, session_rng};
use crate::config::SessionConfig;
use crate::error::QuizError;
use crate::hint::derive_hint;
use crate::model::{AnswerRecord, AttemptResult, ChosenValue, Question, SampledQuestion, Status};
use crate::review::{build_review, ReviewItem};
use crate::scoring::compute_result;
use crate::timer::{QuestionTimer, SessionTimer, TimerSignal};
use crate::tracker::{AttemptTracker, PendingSelection};

/// Something that happened to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    /// Change the pending choice for the current question.
    Select { question_id: String, value: String },
    Submit { question_id: String, value: String },
    /// Commit the pending choice for the current question.
    SubmitSelection { question_id: String },
    Skip { question_id: String },
    RequestHint { question_id: String },
    /// One elapsed second from the host scheduler.
    Tick,
    EnterReview,
    Restart,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start => EventKind::Start,
            Event::Select { .. } => EventKind::Select,
            Event::Submit { .. } | Event::SubmitSelection { .. } => EventKind::Submit,
            Event::Skip { .. } => EventKind::Skip,
            Event::RequestHint { .. } => EventKind::RequestHint,
            Event::Tick => EventKind::Tick,
            Event::EnterReview => EventKind::EnterReview,
            Event::Restart => EventKind::Restart,
        }
    }
}

/// Event names used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Select,
    Submit,
    Skip,
    RequestHint,
    Tick,
    EnterReview,
    Restart,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Start => "start",
            EventKind::Select => "select",
            EventKind::Submit => "submit",
            EventKind::Skip => "skip",
            EventKind::RequestHint => "request a hint",
            EventKind::Tick => "tick",
            EventKind::EnterReview => "enter review",
            EventKind::Restart => "restart",
        };
        write!(f, "{name}")
    }
}

/// What a dispatched event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started,
    Selected,
    /// Moved on; `next_position` is the display position now shown.
    Advanced { next_position: usize },
    /// The final question was committed.
    Completed,
    Hint(String),
    Ticked { remaining_secs: u32 },
    /// The clock ran out; remaining questions were force-skipped.
    Expired,
    ReviewEntered,
    Restarted,
    /// Tick delivered while no countdown was running.
    Ignored,
}

/// One attempt at a quiz.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    duration_secs: u32,
    pool: Vec<Question>,
    rng: StdRng,
    status: Status,
    order: Vec<SampledQuestion>,
    current_index: usize,
    tracker: AttemptTracker,
    session_timer: SessionTimer,
    question_timer: QuestionTimer,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<AttemptResult>,
}

impl Session {
    /// Create an idle session, drawing its questions from `pool`.
    ///
    /// # Errors
    ///
    /// `InvalidDuration` / `InvalidSampleSize` for bad settings, and
    /// `InsufficientPool` when the pool cannot fill the sample.
    pub fn create(pool: Vec<Question>, config: SessionConfig) -> Result<Self, QuizError> {
        let duration_secs = config.validate()?;
        let mut rng = session_rng(config.seed);
        let order = sample(&pool, config.sample_size, &mut rng)?;

        tracing::info!(
            questions = order.len(),
            duration_secs,
            seeded = config.seed.is_some(),
            "session created"
        );

        Ok(Self {
            config,
            duration_secs,
            pool,
            rng,
            status: Status::Idle,
            order,
            current_index: 0,
            tracker: AttemptTracker::new(),
            session_timer: SessionTimer::new(duration_secs),
            question_timer: QuestionTimer::new(),
            started_at: None,
            completed_at: None,
            result: None,
        })
    }

    /// Apply `event` to the session.
    ///
    /// Ticks outside `Active` are ignored, since a host scheduler may still
    /// deliver one queued tick after the attempt ends. Every other event that
    /// does not fit the current state fails with `InvalidTransition`.
    pub fn dispatch(&mut self, event: Event) -> Result<Outcome, QuizError> {
        let kind = event.kind();
        let outcome = match (self.status, event) {
            (Status::Idle, Event::Start) => Ok(self.begin()),
            (Status::Active, Event::Select { question_id, value }) => {
                self.ensure_current(&question_id)?;
                self.tracker.select(&question_id, value)?;
                Ok(Outcome::Selected)
            }
            (Status::Active, Event::Submit { question_id, value }) => {
                self.commit(&question_id, ChosenValue::Answer(value))
            }
            (Status::Active, Event::SubmitSelection { question_id }) => {
                self.ensure_current(&question_id)?;
                let value = self
                    .tracker
                    .pending_selection(&question_id)
                    .and_then(|pending| pending.value.clone())
                    .ok_or_else(|| QuizError::NoSelection {
                        question_id: question_id.clone(),
                    })?;
                self.commit(&question_id, ChosenValue::Answer(value))
            }
            (Status::Active, Event::Skip { question_id }) => {
                self.commit(&question_id, ChosenValue::Skipped)
            }
            (Status::Active, Event::RequestHint { question_id }) => {
                let hint = derive_hint(&self.ensure_current(&question_id)?.question);
                self.tracker.mark_hint(&question_id)?;
                tracing::debug!(question_id = %question_id, "hint requested");
                Ok(Outcome::Hint(hint))
            }
            (Status::Active, Event::Tick) => self.advance_clock(),
            (_, Event::Tick) => Ok(Outcome::Ignored),
            (Status::Completed, Event::EnterReview) => {
                self.status = Status::Review;
                Ok(Outcome::ReviewEntered)
            }
            (Status::Completed | Status::Review, Event::Restart) => self.reset(),
            (status, _) => Err(QuizError::InvalidTransition {
                event: kind,
                status,
            }),
        };

        if let Err(err) = &outcome {
            if err.is_invalid_transition() {
                tracing::warn!(%err, "event rejected");
            } else if !err.is_programming_error() {
                tracing::debug!(%err, "event rejected");
            }
        }
        outcome
    }

    /// Move from `Idle` to `Active`.
    pub fn start(&mut self) -> Result<(), QuizError> {
        self.dispatch(Event::Start).map(|_| ())
    }

    pub fn select(&mut self, question_id: &str, value: impl Into<String>) -> Result<(), QuizError> {
        self.dispatch(Event::Select {
            question_id: question_id.to_string(),
            value: value.into(),
        })
        .map(|_| ())
    }

    pub fn submit(&mut self, question_id: &str, value: impl Into<String>) -> Result<Outcome, QuizError> {
        self.dispatch(Event::Submit {
            question_id: question_id.to_string(),
            value: value.into(),
        })
    }

    pub fn submit_selection(&mut self, question_id: &str) -> Result<Outcome, QuizError> {
        self.dispatch(Event::SubmitSelection {
            question_id: question_id.to_string(),
        })
    }

    pub fn skip(&mut self, question_id: &str) -> Result<Outcome, QuizError> {
        self.dispatch(Event::Skip {
            question_id: question_id.to_string(),
        })
    }

    /// Hint text for the current question. Marks the hint as used.
    pub fn request_hint(&mut self, question_id: &str) -> Result<String, QuizError> {
        match self.dispatch(Event::RequestHint {
            question_id: question_id.to_string(),
        })? {
            Outcome::Hint(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    /// One elapsed second.
    pub fn tick(&mut self) -> Result<Outcome, QuizError> {
        self.dispatch(Event::Tick)
    }

    pub fn enter_review(&mut self) -> Result<(), QuizError> {
        self.dispatch(Event::EnterReview).map(|_| ())
    }

    /// Start over with a freshly sampled question set.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        self.dispatch(Event::Restart).map(|_| ())
    }

    /// Tear down an attempt that the learner walked away from.
    ///
    /// Stops both clocks and discards the ledger without producing a result.
    /// The session returns to `Idle` and may be started again.
    pub fn abandon(&mut self) {
        if self.status == Status::Active {
            tracing::info!(
                answered = self.tracker.len(),
                total = self.order.len(),
                "attempt abandoned"
            );
        }
        self.session_timer.cancel();
        self.question_timer.cancel();
        self.status = Status::Idle;
        self.current_index = 0;
        self.tracker = AttemptTracker::new();
        self.session_timer = SessionTimer::new(self.duration_secs);
        self.question_timer = QuestionTimer::new();
        self.started_at = None;
        self.completed_at = None;
        self.result = None;
    }

    /// The attempt result. Only available once completed.
    pub fn result(&self) -> Result<&AttemptResult, QuizError> {
        match (&self.result, self.status) {
            (Some(result), Status::Completed | Status::Review) => Ok(result),
            _ => Err(QuizError::ResultUnavailable {
                status: self.status,
            }),
        }
    }

    /// Review items for every question, in display order.
    pub fn review(&self) -> Result<Vec<ReviewItem>, QuizError> {
        self.result()?;
        Ok(build_review(&self.order, self.tracker.ledger()))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The question on screen, while active.
    pub fn current_question(&self) -> Option<&SampledQuestion> {
        match self.status {
            Status::Active => self.order.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_count(&self) -> usize {
        self.order.len()
    }

    pub fn question_order(&self) -> &[SampledQuestion] {
        &self.order
    }

    pub fn ledger(&self) -> &[AnswerRecord] {
        self.tracker.ledger()
    }

    pub fn pending_selection(&self, question_id: &str) -> Option<&PendingSelection> {
        self.tracker.pending_selection(question_id)
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.session_timer.remaining_secs()
    }

    pub fn question_elapsed_secs(&self) -> u32 {
        self.question_timer.elapsed_secs()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, Status::Completed | Status::Review)
    }

    fn begin(&mut self) -> Outcome {
        self.status = Status::Active;
        self.current_index = 0;
        self.tracker = AttemptTracker::new();
        self.session_timer = SessionTimer::new(self.duration_secs);
        self.question_timer = QuestionTimer::new();
        self.started_at = Some(Utc::now());
        self.completed_at = None;
        self.result = None;
        tracing::info!(total = self.order.len(), "attempt started");
        Outcome::Started
    }

    fn reset(&mut self) -> Result<Outcome, QuizError> {
        let order = sample(&self.pool, self.config.sample_size, &mut self.rng)?;
        self.order = order;
        self.begin();
        Ok(Outcome::Restarted)
    }

    fn ensure_current(&self, question_id: &str) -> Result<&SampledQuestion, QuizError> {
        let current = self
            .order
            .get(self.current_index)
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;
        if current.question.id != question_id {
            if !self.order.iter().any(|s| s.question.id == question_id) {
                return Err(QuizError::UnknownQuestion(question_id.to_string()));
            }
            return Err(QuizError::QuestionMismatch {
                expected: current.question.id.clone(),
                actual: question_id.to_string(),
            });
        }
        Ok(current)
    }

    fn commit(&mut self, question_id: &str, chosen: ChosenValue) -> Result<Outcome, QuizError> {
        let is_correct = match &chosen {
            ChosenValue::Answer(value) => self.ensure_current(question_id)?.question.is_correct(value),
            ChosenValue::Skipped => {
                self.ensure_current(question_id)?;
                false
            }
        };
        let hint_used = self.tracker.hint_used(question_id);
        let time_spent = self.question_timer.elapsed_secs();

        let record = self
            .tracker
            .record(question_id, chosen, is_correct, time_spent, hint_used)?;
        tracing::debug!(
            question_id,
            correct = record.is_correct,
            skipped = record.chosen.is_skipped(),
            time_spent,
            "answer recorded"
        );

        self.current_index += 1;
        self.question_timer.reset();

        if self.current_index == self.order.len() {
            self.complete();
            Ok(Outcome::Completed)
        } else {
            Ok(Outcome::Advanced {
                next_position: self.current_index + 1,
            })
        }
    }

    fn advance_clock(&mut self) -> Result<Outcome, QuizError> {
        self.question_timer.tick();
        match self.session_timer.tick() {
            TimerSignal::Running { remaining_secs } => Ok(Outcome::Ticked { remaining_secs }),
            TimerSignal::Expired => self.expire(),
            TimerSignal::Idle => Ok(Outcome::Ignored),
        }
    }

    /// Force-skip everything not yet answered, then complete.
    fn expire(&mut self) -> Result<Outcome, QuizError> {
        let remaining = self.order.len() - self.current_index;
        tracing::info!(remaining, "time expired, skipping remaining questions");

        while self.current_index < self.order.len() {
            let question_id = self.order[self.current_index].question.id.clone();
            let hint_used = self.tracker.hint_used(&question_id);
            let time_spent = self.question_timer.elapsed_secs();
            self.tracker
                .record(&question_id, ChosenValue::Skipped, false, time_spent, hint_used)?;
            self.current_index += 1;
            self.question_timer.reset();
        }

        self.complete();
        Ok(Outcome::Expired)
    }

    fn complete(&mut self) {
        if self.result.is_some() {
            return;
        }
        self.session_timer.cancel();
        self.question_timer.cancel();
        self.status = Status::Completed;
        self.completed_at = Some(Utc::now());

        let result = compute_result(&self.order, self.tracker.ledger());
        tracing::info!(
            score = result.score_percent,
            correct = result.correct_count,
            total = result.total_count,
            badge = %result.badge_tier,
            "attempt completed"
        );
        self.result = Some(result);
    }
}

//! quizforge-core — Timed assessment engine.
//!
//! This crate holds the quiz data model and the pieces that run a single
//! attempt: question sampling, countdown timers, the answer ledger, scoring,
//! and the session state machine that ties them together.

pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod hint;
pub mod model;
pub mod parser;
pub mod report;
pub mod review;
pub mod scoring;
pub mod session;
pub mod sink;
pub mod timer;
pub mod tracker;
pub mod traits;

pub use error::QuizError;
pub use session::{Event, EventKind, Outcome, Session};

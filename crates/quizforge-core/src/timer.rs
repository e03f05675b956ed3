//! Session and per-question clocks, plus the periodic tick source.
//!
//! [`SessionTimer`] and [`QuestionTimer`] are plain counters advanced by
//! whoever owns the tick source. [`TickerHandle`] is that source for async
//! hosts: a tokio interval task that is aborted on `cancel()` and on drop, so
//! a ticker can never outlive the session that owns it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// What a session-timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Time left after this tick.
    Running { remaining_secs: u32 },
    /// This tick reached zero. Fired exactly once.
    Expired,
    /// The timer is already expired or cancelled; nothing changed.
    Idle,
}

/// Countdown for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    duration_secs: u32,
    remaining_secs: u32,
    expired: bool,
    cancelled: bool,
}

impl SessionTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            expired: duration_secs == 0,
            cancelled: false,
        }
    }

    /// Advance one second.
    pub fn tick(&mut self) -> TimerSignal {
        if self.cancelled || self.expired {
            return TimerSignal::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            TimerSignal::Expired
        } else {
            TimerSignal::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Freeze the timer. Later ticks are no-ops.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Counts up from zero while a question is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionTimer {
    elapsed_secs: u32,
    cancelled: bool,
}

impl QuestionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        if !self.cancelled {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    /// Start counting again for the next question.
    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }
}

/// Owned handle to a running periodic tick task.
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Spawn a task that sends one `()` per `period`, starting one period
    /// from now. Must be called inside a tokio runtime.
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker started");
        (Self { task: Some(task) }, rx)
    }

    /// Stop the tick task. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("ticker cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

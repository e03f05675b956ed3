//! Async session driver.
//!
//! [`QuizDriver`] owns a [`Session`] and feeds it from two sources: host
//! commands arriving on a channel and a periodic ticker. It stops the ticker
//! on every exit path, hands finished attempts to an optional
//! [`AttemptSink`] without waiting on it, and reports progress to a
//! [`SessionObserver`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::QuizError;
use crate::model::{Question, Status};
use crate::report::{AttemptReport, BankSummary};
use crate::session::{Event, EventKind, Outcome, Session};
use crate::timer::TickerHandle;
use crate::traits::AttemptSink;

/// Input from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Deliver an event as-is.
    Dispatch(Event),
    /// Answer whatever question is current. See [`resolve_choice`].
    AnswerCurrent(String),
    SkipCurrent,
    HintCurrent,
    /// Walk away from the attempt.
    Abandon,
}

/// Progress callbacks.
pub trait SessionObserver: Send + Sync {
    fn on_started(&self, session: &Session);
    fn on_outcome(&self, session: &Session, outcome: &Outcome);
    fn on_rejected(&self, error: &QuizError);
    fn on_complete(&self, report: &AttemptReport);
    fn on_abandoned(&self);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_started(&self, _: &Session) {}
    fn on_outcome(&self, _: &Session, _: &Outcome) {}
    fn on_rejected(&self, _: &QuizError) {}
    fn on_complete(&self, _: &AttemptReport) {}
    fn on_abandoned(&self) {}
}

/// Configuration for the driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Wall-clock length of one session second.
    pub tick_period: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
        }
    }
}

/// How a driven attempt ended.
#[derive(Debug)]
pub enum DriverOutcome {
    Completed(Box<AttemptReport>),
    Abandoned,
}

/// Map host input onto an answer value.
///
/// Input that is exactly one of the options is taken as that option. A
/// 1-based option number picks that option; a comma-separated list of
/// numbers picks several. Anything else is taken literally.
pub fn resolve_choice(question: &Question, input: &str) -> String {
    let input = input.trim();
    if question.options.iter().any(|option| option == input) {
        return input.to_string();
    }
    let pick = |part: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.options.get(i))
            .cloned()
    };

    let picked: Option<Vec<String>> = input.split(',').map(pick).collect();
    match picked {
        Some(values) if !values.is_empty() => values.join(", "),
        _ => input.to_string(),
    }
}

/// Drives one session from host commands and a ticker.
pub struct QuizDriver {
    session: Session,
    bank: BankSummary,
    config: DriverConfig,
    sink: Option<Arc<dyn AttemptSink>>,
    ticker: Option<TickerHandle>,
    saves: Vec<JoinHandle<()>>,
}

impl QuizDriver {
    pub fn new(session: Session, bank: BankSummary, config: DriverConfig) -> Self {
        Self {
            session,
            bank,
            config,
            sink: None,
            ticker: None,
            saves: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn AttemptSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the attempt until it completes or is abandoned.
    ///
    /// Starts the session if it is idle. A closed command channel counts as
    /// abandonment. Rejected events are passed to the observer and do not
    /// stop the run.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<Command>,
        observer: &dyn SessionObserver,
    ) -> Result<DriverOutcome, QuizError> {
        match self.session.status() {
            Status::Idle => self.session.start()?,
            Status::Active => {}
            status => {
                return Err(QuizError::InvalidTransition {
                    event: EventKind::Start,
                    status,
                })
            }
        }
        observer.on_started(&self.session);

        let (ticker, mut ticks) = TickerHandle::spawn(self.config.tick_period);
        self.ticker = Some(ticker);

        let finished = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Abandon) | None => break false,
                    Some(command) => self.handle(command, observer),
                },
                Some(()) = ticks.recv() => self.apply(Event::Tick, observer),
            }
            if self.session.is_finished() {
                break true;
            }
        };

        self.stop_ticker();

        if !finished {
            self.session.abandon();
            observer.on_abandoned();
            return Ok(DriverOutcome::Abandoned);
        }

        let report = AttemptReport::from_session(&self.session, self.bank.clone())?;
        observer.on_complete(&report);
        self.persist(&report);
        Ok(DriverOutcome::Completed(Box::new(report)))
    }

    pub fn enter_review(&mut self) -> Result<(), QuizError> {
        self.session.enter_review()
    }

    /// Re-sample and reactivate the session. Call [`run`](Self::run) again
    /// to drive the new attempt.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        self.session.restart()
    }

    /// Wait for outstanding saves to finish.
    pub async fn flush(&mut self) {
        for save in self.saves.drain(..) {
            if let Err(e) = save.await {
                tracing::warn!("attempt save task failed: {e}");
            }
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickerHandle::is_active)
    }

    fn handle(&mut self, command: Command, observer: &dyn SessionObserver) {
        let event = match command {
            Command::Dispatch(event) => event,
            Command::Abandon => return,
            current => {
                let Some(sampled) = self.session.current_question() else {
                    return;
                };
                let question_id = sampled.question.id.clone();
                match current {
                    Command::AnswerCurrent(input) => Event::Submit {
                        value: resolve_choice(&sampled.question, &input),
                        question_id,
                    },
                    Command::HintCurrent => Event::RequestHint { question_id },
                    _ => Event::Skip { question_id },
                }
            }
        };
        self.apply(event, observer);
    }

    fn apply(&mut self, event: Event, observer: &dyn SessionObserver) {
        match self.session.dispatch(event) {
            Ok(Outcome::Ignored) => {}
            Ok(outcome) => observer.on_outcome(&self.session, &outcome),
            Err(e) => observer.on_rejected(&e),
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn persist(&mut self, report: &AttemptReport) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        let report = report.clone();
        self.saves.push(tokio::spawn(async move {
            if let Err(e) = sink.save_attempt(&report).await {
                tracing::warn!(sink = sink.name(), "failed to save attempt: {e:#}");
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::make_question;
    use crate::config::SessionConfig;
    use crate::model::{BadgeTier, Difficulty, QuestionKind};
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: impl Into<String>) {
            self.events.lock().unwrap().push(event.into());
        }
    }

    impl SessionObserver for RecordingObserver {
        fn on_started(&self, _: &Session) {
            self.push("started");
        }
        fn on_outcome(&self, _: &Session, outcome: &Outcome) {
            self.push(format!("{outcome:?}"));
        }
        fn on_rejected(&self, error: &QuizError) {
            self.push(format!("rejected: {error}"));
        }
        fn on_complete(&self, report: &AttemptReport) {
            self.push(format!("complete: {}", report.result.score_percent));
        }
        fn on_abandoned(&self) {
            self.push("abandoned");
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AttemptSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn save_attempt(&self, _: &AttemptReport) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn driver(size: usize, duration: i64) -> QuizDriver {
        let pool: Vec<Question> = (0..size)
            .map(|i| make_question(&format!("q{i}"), "right", "misc", Difficulty::Easy))
            .collect();
        let session = Session::create(pool, SessionConfig::new(size, duration).with_seed(3)).unwrap();
        let bank = BankSummary {
            id: "bank".into(),
            name: "Bank".into(),
            question_count: size,
        };
        QuizDriver::new(session, bank, DriverConfig::default())
    }

    fn completed(outcome: DriverOutcome) -> Box<AttemptReport> {
        match outcome {
            DriverOutcome::Completed(report) => report,
            DriverOutcome::Abandoned => panic!("expected completion"),
        }
    }

    #[test]
    fn resolve_choice_maps_option_numbers() {
        let question = make_question("q", "right", "misc", Difficulty::Easy);
        assert_eq!(resolve_choice(&question, "1"), "right");
        assert_eq!(resolve_choice(&question, " 2 "), "wrong-1");
        assert_eq!(resolve_choice(&question, "1,3"), "right, wrong-2");
        assert_eq!(resolve_choice(&question, "9"), "9");
        assert_eq!(resolve_choice(&question, "mut"), "mut");

        let mut code = question.clone();
        code.kind = QuestionKind::CodeBlank;
        code.options.clear();
        assert_eq!(resolve_choice(&code, "1"), "1");
    }

    #[test]
    fn numeric_option_text_wins_over_position() {
        let mut question = make_question("n", "2", "numbers", Difficulty::Easy);
        question.options = vec!["0".into(), "1".into(), "2".into()];

        assert_eq!(resolve_choice(&question, "2"), "2");
        assert_eq!(resolve_choice(&question, "0"), "0");
        assert!(question.is_correct(&resolve_choice(&question, " 2 ")));
        // "3" is not an option, so it still picks the third one.
        assert_eq!(resolve_choice(&question, "3"), "2");
    }

    #[tokio::test(start_paused = true)]
    async fn answers_every_question_and_saves() {
        let mut driver = driver(3, 60);
        let sink = Arc::new(MemorySink::new());
        driver = driver.with_sink(sink.clone());

        let (tx, rx) = mpsc::channel(8);
        for _ in 0..3 {
            tx.send(Command::AnswerCurrent("1".into())).await.unwrap();
        }

        let observer = RecordingObserver::default();
        let report = completed(driver.run(rx, &observer).await.unwrap());
        assert_eq!(report.result.score_percent, 100);
        assert_eq!(report.result.badge_tier, BadgeTier::Top);
        assert!(!driver.is_ticking());

        driver.flush().await;
        assert_eq!(sink.saved().await.len(), 1);
        assert_eq!(observer.events().first().map(String::as_str), Some("started"));
        assert_eq!(observer.events().last().map(String::as_str), Some("complete: 100"));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_completes_with_skips() {
        let mut driver = driver(4, 3);
        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::SkipCurrent).await.unwrap();

        let observer = RecordingObserver::default();
        let report = completed(driver.run(rx, &observer).await.unwrap());
        drop(tx);

        assert_eq!(report.result.skipped_count, 4);
        assert_eq!(report.result.score_percent, 0);
        assert_eq!(driver.session().time_remaining_secs(), 0);
        assert!(observer.events().contains(&"Expired".to_string()));
        assert!(!driver.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_discards_attempt() {
        let mut driver = driver(3, 60);
        let sink = Arc::new(MemorySink::new());
        driver = driver.with_sink(sink.clone());

        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::AnswerCurrent("right".into())).await.unwrap();
        tx.send(Command::Abandon).await.unwrap();

        let observer = RecordingObserver::default();
        let outcome = driver.run(rx, &observer).await.unwrap();
        assert!(matches!(outcome, DriverOutcome::Abandoned));
        assert_eq!(driver.session().status(), Status::Idle);
        assert!(driver.session().ledger().is_empty());
        assert!(!driver.is_ticking());

        driver.flush().await;
        assert!(sink.saved().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_counts_as_abandon() {
        let mut driver = driver(2, 60);
        let (tx, rx) = mpsc::channel::<Command>(1);
        drop(tx);

        let outcome = driver.run(rx, &NoopObserver).await.unwrap();
        assert!(matches!(outcome, DriverOutcome::Abandoned));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sink_does_not_change_outcome() {
        let mut driver = driver(1, 60).with_sink(Arc::new(FailingSink));
        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::SkipCurrent).await.unwrap();

        let report = completed(driver.run(rx, &NoopObserver).await.unwrap());
        driver.flush().await;
        assert_eq!(report.result.total_count, 1);
        assert_eq!(driver.session().status(), Status::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_events_are_reported_and_run_continues() {
        let mut driver = driver(2, 60);
        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::Dispatch(Event::EnterReview)).await.unwrap();
        tx.send(Command::SkipCurrent).await.unwrap();
        tx.send(Command::SkipCurrent).await.unwrap();

        let observer = RecordingObserver::default();
        completed(driver.run(rx, &observer).await.unwrap());
        assert!(observer
            .events()
            .iter()
            .any(|e| e.starts_with("rejected: cannot enter review")));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_runs_a_fresh_attempt() {
        let mut driver = driver(2, 60);
        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::SkipCurrent).await.unwrap();
        tx.send(Command::SkipCurrent).await.unwrap();
        completed(driver.run(rx, &NoopObserver).await.unwrap());

        assert!(driver.run(mpsc::channel(1).1, &NoopObserver).await.is_err());

        driver.enter_review().unwrap();
        driver.restart().unwrap();
        assert_eq!(driver.session().status(), Status::Active);

        let (tx, rx) = mpsc::channel(8);
        tx.send(Command::AnswerCurrent("1".into())).await.unwrap();
        tx.send(Command::AnswerCurrent("1".into())).await.unwrap();
        let report = completed(driver.run(rx, &NoopObserver).await.unwrap());
        assert_eq!(report.result.score_percent, 100);
    }
}

//! The `quizforge run` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use quizforge_core::bank::usable_questions;
use quizforge_core::config::{load_config_from, SessionConfig};
use quizforge_core::engine::{Command, DriverConfig, DriverOutcome, QuizDriver, SessionObserver};
use quizforge_core::model::QuestionKind;
use quizforge_core::parser::{validate_question_bank, TomlBankSource};
use quizforge_core::report::{AttemptReport, BankSummary};
use quizforge_core::sink::JsonDirSink;
use quizforge_core::traits::QuestionSource;
use quizforge_core::{Outcome, QuizError, Session};
use quizforge_report::{write_html_report, write_markdown_report};

const FORMATS: [&str; 3] = ["json", "html", "markdown"];

/// Seconds-left marks at which a warning is printed.
const TIME_WARNINGS: [u32; 3] = [60, 30, 10];

pub struct RunArgs {
    pub bank: PathBuf,
    pub sample_size: Option<usize>,
    pub duration: Option<i64>,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub no_review: bool,
}

/// Console observer: prints questions, hints and timer warnings.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_started(&self, session: &Session) {
        println!(
            "Starting quiz: {} questions, {}s on the clock.",
            session.total_count(),
            session.time_remaining_secs()
        );
        println!("Answer with an option number or text. s = skip, h = hint, q = quit.");
        print_current(session);
    }

    fn on_outcome(&self, session: &Session, outcome: &Outcome) {
        match outcome {
            Outcome::Advanced { .. } | Outcome::Restarted => print_current(session),
            Outcome::Hint(text) => println!("Hint: {text}"),
            Outcome::Ticked { remaining_secs } if TIME_WARNINGS.contains(remaining_secs) => {
                println!("({remaining_secs}s left)");
            }
            Outcome::Expired => println!("\nTime is up! Remaining questions were skipped."),
            _ => {}
        }
    }

    fn on_rejected(&self, error: &QuizError) {
        eprintln!("  {error}");
    }

    fn on_complete(&self, _: &AttemptReport) {
        println!("\nQuiz complete.");
    }

    fn on_abandoned(&self) {
        println!("\nQuiz abandoned. No result recorded.");
    }
}

fn print_current(session: &Session) {
    let Some(sampled) = session.current_question() else {
        return;
    };
    let q = &sampled.question;

    println!(
        "\nQuestion {}/{} [{}, {}] ({}s left)",
        sampled.position,
        session.total_count(),
        q.difficulty,
        q.category,
        session.time_remaining_secs()
    );
    println!("{}", q.prompt.trim());
    if let (QuestionKind::CodeBlank, Some(template)) = (q.kind, &q.code_template) {
        for line in template.lines() {
            println!("    {line}");
        }
    }
    for (i, option) in q.options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
}

/// Read stdin on a plain thread and forward commands to the driver.
fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let command = match line.trim() {
                "" => continue,
                "q" | "quit" => Command::Abandon,
                "s" | "skip" => Command::SkipCurrent,
                "h" | "hint" => Command::HintCurrent,
                answer => Command::AnswerCurrent(answer.to_string()),
            };
            let quit = command == Command::Abandon;
            if tx.blocking_send(command).is_err() || quit {
                break;
            }
        }
    });
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let formats: Vec<&str> = if args.format == "all" {
        FORMATS.to_vec()
    } else {
        args.format.split(',').map(str::trim).collect()
    };
    if let Some(unknown) = formats.iter().find(|f| !FORMATS.contains(f)) {
        anyhow::bail!("unknown format: {unknown} (expected json, html, markdown or all)");
    }

    let config = load_config_from(args.config.as_deref())?;
    let output = args.output.unwrap_or_else(|| config.results_dir.clone());

    let source = TomlBankSource::new(&args.bank);
    let set = source.load_questions()?;
    let warnings = validate_question_bank(&set);
    if !warnings.is_empty() {
        tracing::warn!(
            bank = %source.describe(),
            warnings = warnings.len(),
            "bank has validation warnings; run `quizforge validate` for details"
        );
    }

    let usable = usable_questions(&set.questions).len();
    anyhow::ensure!(usable > 0, "bank {} has no usable questions", set.name);

    let sample_size = args
        .sample_size
        .or(set.sample_size)
        .unwrap_or_else(|| config.default_sample_size.min(usable));
    let duration = args
        .duration
        .or(set.duration_secs)
        .unwrap_or(config.default_duration_secs);
    let mut session_config = SessionConfig::new(sample_size, duration);
    if let Some(seed) = args.seed.or(config.seed) {
        session_config = session_config.with_seed(seed);
    }

    let bank = BankSummary::of(&set);
    let session = Session::create(set.questions, session_config)?;

    println!("quizforge v{} | {}", env!("CARGO_PKG_VERSION"), bank.name);

    let driver_config = DriverConfig {
        tick_period: Duration::from_millis(config.tick_millis),
    };
    let mut driver = QuizDriver::new(session, bank, driver_config);
    let save_json = config.save_results && formats.contains(&"json");
    if save_json {
        driver = driver.with_sink(Arc::new(JsonDirSink::new(&output)));
    }

    let (tx, rx) = mpsc::channel(32);
    spawn_input_reader(tx);

    let report = match driver.run(rx, &ConsoleObserver).await? {
        DriverOutcome::Completed(report) => report,
        DriverOutcome::Abandoned => return Ok(()),
    };

    print_summary(&report);

    if !args.no_review {
        println!("\nReview:\n");
        for item in &report.review {
            println!("{}", item.to_text());
        }
    }

    driver.flush().await;
    if save_json {
        println!("Attempt saved to: {}", output.join(report.file_name()).display());
    }

    for fmt in &formats {
        match *fmt {
            "html" => {
                let path = output.join(format!("attempt-{}.html", report.id));
                write_html_report(&report, &path)?;
                println!("HTML report: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("attempt-{}.md", report.id));
                write_markdown_report(&report, &path)?;
                println!("Markdown report: {}", path.display());
            }
            _ => {}
        }
    }

    Ok(())
}

fn print_summary(report: &AttemptReport) {
    use comfy_table::{Cell, Table};

    let result = &report.result;

    let mut table = Table::new();
    table.set_header(vec!["Score", "Badge", "Correct", "Skipped", "Hints", "Time"]);
    table.add_row(vec![
        Cell::new(format!("{}%", result.score_percent)),
        Cell::new(result.badge_tier),
        Cell::new(format!("{}/{}", result.correct_count, result.total_count)),
        Cell::new(result.skipped_count),
        Cell::new(result.hints_used),
        Cell::new(format!("{}s", result.total_time_secs)),
    ]);
    println!("\n{table}");

    if result.category_breakdown.is_empty() {
        return;
    }
    let mut categories = Table::new();
    categories.set_header(vec!["Category", "Correct", "Total", "Rate"]);
    for (name, bucket) in &result.category_breakdown {
        categories.add_row(vec![
            Cell::new(name),
            Cell::new(bucket.correct),
            Cell::new(bucket.total),
            Cell::new(format!("{:.0}%", bucket.rate() * 100.0)),
        ]);
    }
    println!("{categories}");
}

//! quizforge CLI: timed quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Timed quizzes with scoring, hints and review")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed quiz
    Run {
        /// Path to a .toml question bank or a directory of banks
        #[arg(long)]
        bank: PathBuf,

        /// Number of questions to draw
        #[arg(long)]
        sample_size: Option<usize>,

        /// Session length in seconds
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,

        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (defaults to the configured results_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Skip the per-question review after the summary
        #[arg(long)]
        no_review: bool,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show the review of a saved attempt
    Review {
        /// Attempt report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare two saved attempts
    Compare {
        /// Baseline attempt JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current attempt JSON
        #[arg(long)]
        current: PathBuf,

        /// Category changes within this many percentage points count as unchanged
        #[arg(long, default_value = "0")]
        threshold: u32,

        /// Exit code 1 if the score or a category went down
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizforge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            sample_size,
            duration,
            seed,
            config,
            output,
            format,
            no_review,
        } => {
            commands::run::execute(commands::run::RunArgs {
                bank,
                sample_size,
                duration,
                seed,
                config,
                output,
                format,
                no_review,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Review { report, format } => commands::review::execute(report, format),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

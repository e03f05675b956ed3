//! The `quizforge review` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::report::AttemptReport;
use quizforge_report::{generate_html, generate_markdown};

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => print!("{}", generate_markdown(&report)),
        "html" => println!("{}", generate_html(&report)),
        "text" => {
            let result = &report.result;
            println!(
                "{}: {}% ({}), {}/{} correct, {} skipped, {} hints, {}s",
                report.bank.name,
                result.score_percent,
                result.badge_tier,
                result.correct_count,
                result.total_count,
                result.skipped_count,
                result.hints_used,
                result.total_time_secs
            );
            if let Some(completed) = report.completed_at {
                println!("Completed {}", completed.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            println!();
            for item in &report.review {
                println!("{}", item.to_text());
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text, markdown or html)"),
    }

    Ok(())
}

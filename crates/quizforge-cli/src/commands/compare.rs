//! The `quizforge compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::report::AttemptReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: u32,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = AttemptReport::load_json(&baseline_path)?;
    let current = AttemptReport::load_json(&current_path)?;

    if baseline.bank.id != current.bank.id {
        tracing::warn!(
            baseline = %baseline.bank.id,
            current = %current.bank.id,
            "comparing attempts from different banks"
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Score: {}% -> {}% ({:+})",
                report.baseline_score, report.current_score, report.score_delta
            );
            if report.baseline_badge == report.current_badge {
                println!("Badge: {}", report.current_badge);
            } else {
                println!("Badge: {} -> {}", report.baseline_badge, report.current_badge);
            }
            println!(
                "Categories: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            for (title, rows) in [("Regressions", &report.regressions), ("Improvements", &report.improvements)] {
                if rows.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for d in rows {
                    println!(
                        "  {} {}/{} -> {}/{} ({:+})",
                        d.category,
                        d.baseline.correct,
                        d.baseline.total,
                        d.current.correct,
                        d.current.total,
                        d.delta
                    );
                }
            }

            if report.new_categories > 0 {
                println!("\n{} new categor(ies)", report.new_categories);
            }
            if report.removed_categories > 0 {
                println!("{} removed categor(ies)", report.removed_categories);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

//! Markdown report generator.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use quizforge_core::report::AttemptReport;

/// Generate a Markdown report from an attempt report.
pub fn generate_markdown(report: &AttemptReport) -> String {
    let result = &report.result;
    let mut md = String::new();

    let _ = writeln!(md, "# quizforge attempt: {}\n", report.bank.name);
    let _ = writeln!(
        md,
        "**Score:** {}% ({}) | {}/{} correct | {} skipped | {} hints | {}s\n",
        result.score_percent,
        result.badge_tier,
        result.correct_count,
        result.total_count,
        result.skipped_count,
        result.hints_used,
        result.total_time_secs
    );

    if !result.category_breakdown.is_empty() {
        md.push_str("## By category\n\n");
        md.push_str("| Category | Correct | Total |\n");
        md.push_str("|----------|---------|-------|\n");
        for (category, bucket) in &result.category_breakdown {
            let _ = writeln!(md, "| {category} | {} | {} |", bucket.correct, bucket.total);
        }
        md.push('\n');
    }

    if !result.difficulty_breakdown.is_empty() {
        md.push_str("## By difficulty\n\n");
        md.push_str("| Difficulty | Correct | Total |\n");
        md.push_str("|------------|---------|-------|\n");
        for (difficulty, bucket) in &result.difficulty_breakdown {
            let _ = writeln!(md, "| {difficulty} | {} | {} |", bucket.correct, bucket.total);
        }
        md.push('\n');
    }

    if !report.review.is_empty() {
        md.push_str("## Review\n\n");
        for item in &report.review {
            let mark = if item.is_correct { "✅" } else { "❌" };
            let _ = writeln!(md, "### {}. {mark} {}\n", item.position, item.prompt.trim());

            match &item.code {
                Some(code) => {
                    match &code.answered {
                        Some(answered) => {
                            let _ = writeln!(md, "Your code:\n\n```rust\n{}\n```\n", answered.trim_end());
                        }
                        None => md.push_str("Your code: *skipped*\n\n"),
                    }
                    if !item.is_correct {
                        let _ = writeln!(md, "Expected:\n\n```rust\n{}\n```\n", code.expected.trim_end());
                    }
                }
                None => {
                    let _ = writeln!(md, "- Your answer: `{}`", item.chosen);
                    if !item.is_correct {
                        let _ = writeln!(md, "- Correct answer: `{}`", item.correct_answer);
                    }
                }
            }
            if item.hint_used {
                md.push_str("- Hint used\n");
            }
            let _ = writeln!(md, "- Time: {}s", item.time_spent_secs);
            if !item.explanation.trim().is_empty() {
                let _ = writeln!(md, "\n> {}", item.explanation.trim());
            }
            md.push('\n');
        }
    }

    md
}

/// Write a Markdown report to a file.
pub fn write_markdown_report(report: &AttemptReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))?;
    Ok(())
}

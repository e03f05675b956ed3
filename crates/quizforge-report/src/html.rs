//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use quizforge_core::model::{BadgeTier, Bucket};
use quizforge_core::report::AttemptReport;
use quizforge_core::review::ReviewItem;
use quizforge_core::scoring::{badge_tier, score_percent};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an attempt report.
pub fn generate_html(report: &AttemptReport) -> String {
    let result = &report.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizforge attempt: {}</title>\n",
        html_escape(&report.bank.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizforge attempt</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} of {} questions | {}</p>\n",
        html_escape(&report.bank.name),
        result.total_count,
        report.bank.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">{}% <span class=\"badge badge-{}\">{}</span></p>\n",
        result.score_percent,
        result.badge_tier.to_string().to_lowercase(),
        result.badge_tier
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Correct</th><th>Skipped</th><th>Hints</th><th>Time</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}/{}</td><td>{}</td><td>{}</td><td>{}s of {}s</td></tr></tbody></table>\n",
        result.correct_count,
        result.total_count,
        result.skipped_count,
        result.hints_used,
        result.total_time_secs,
        report.duration_secs,
    ));

    if !result.category_breakdown.is_empty() {
        html.push_str("<h3>By category</h3>\n");
        html.push_str(&generate_bar_chart(&result.category_breakdown));
    }
    if !result.difficulty_breakdown.is_empty() {
        let by_difficulty: BTreeMap<String, Bucket> = result
            .difficulty_breakdown
            .iter()
            .map(|(d, b)| (d.to_string(), *b))
            .collect();
        html.push_str("<h3>By difficulty</h3>\n");
        html.push_str(&generate_bar_chart(&by_difficulty));
    }

    html.push_str("</section>\n");

    // Per-question review
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Review</h2>\n");
    html.push_str("<button type=\"button\" onclick=\"toggleMissed(this)\">Show missed only</button>\n");
    html.push_str("<table class=\"review\" id=\"results\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Time</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for item in &report.review {
        html.push_str(&review_row(item));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // Missed-only filter
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn review_row(item: &ReviewItem) -> String {
    let class = if item.is_correct { "pass" } else { "fail" };

    let mut question = html_escape(&item.prompt);
    let mut answer = html_escape(&item.chosen.to_string());
    let mut expected = html_escape(&item.correct_answer);

    if let Some(code) = &item.code {
        if let Some(answered) = &code.answered {
            answer = format!("<pre><code>{}</code></pre>", html_escape(answered));
        }
        expected = format!("<pre><code>{}</code></pre>", html_escape(&code.expected));
    }
    if item.hint_used {
        question.push_str(" <span class=\"hint\">(hint used)</span>");
    }
    if !item.explanation.trim().is_empty() {
        question.push_str(&format!(
            "<details><summary>Explanation</summary>{}</details>",
            html_escape(item.explanation.trim())
        ));
    }
    if item.chosen.is_skipped() {
        answer = "<em>skipped</em>".to_string();
    }

    format!(
        "<tr class=\"{class}\"><td>{}</td><td>{question}</td><td>{answer}</td><td>{expected}</td><td>{}s</td></tr>\n",
        item.position, item.time_spent_secs
    )
}

const ROW_HEIGHT: usize = 26;
const ROW_GAP: usize = 8;
const LABEL_WIDTH: usize = 160;
const TRACK_WIDTH: usize = 360;

/// One horizontal bar per bucket, drawn over a full-width track and
/// coloured by the badge tier its hit rate would earn.
fn generate_bar_chart(buckets: &BTreeMap<String, Bucket>) -> String {
    let height = buckets.len() * (ROW_HEIGHT + ROW_GAP);
    let mut svg = format!(
        "<svg width=\"{}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\" role=\"img\">\n",
        LABEL_WIDTH + TRACK_WIDTH + 120
    );

    for (row, (label, bucket)) in buckets.iter().enumerate() {
        let top = row * (ROW_HEIGHT + ROW_GAP);
        let middle = top + ROW_HEIGHT / 2;
        let percent = score_percent(bucket.correct, bucket.total);
        let fill = TRACK_WIDTH * percent as usize / 100;
        let color = match badge_tier(percent) {
            BadgeTier::Top => "#16a34a",
            BadgeTier::Expert => "#4f46e5",
            BadgeTier::Learner => "#ca8a04",
            BadgeTier::Beginner => "#dc2626",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{middle}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            LABEL_WIDTH - 8,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{LABEL_WIDTH}\" y=\"{top}\" width=\"{TRACK_WIDTH}\" height=\"{ROW_HEIGHT}\" fill=\"currentColor\" fill-opacity=\"0.08\" rx=\"3\"/>\n"
        ));
        svg.push_str(&format!(
            "  <rect x=\"{LABEL_WIDTH}\" y=\"{top}\" width=\"{fill}\" height=\"{ROW_HEIGHT}\" fill=\"{color}\" rx=\"3\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{middle}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{} ({percent}%)</text>\n",
            LABEL_WIDTH + TRACK_WIDTH + 8,
            bucket.correct,
            bucket.total
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --paper: #fcfcfd; --ink: #18181b; --muted: #71717a; --rule: #e4e4e7; --right: #e7f8ec; --wrong: #fdecec; --accent: #4f46e5; }
@media (prefers-color-scheme: dark) {
  :root { --paper: #0f1115; --ink: #ececf1; --muted: #a1a1aa; --rule: #2e3038; --right: #12372a; --wrong: #451a1a; --accent: #818cf8; }
}
body { font-family: system-ui, sans-serif; max-width: 1100px; margin: 0 auto; padding: 2rem 1.5rem; background: var(--paper); color: var(--ink); line-height: 1.5; }
header { border-bottom: 2px solid var(--rule); padding-bottom: 1rem; }
.meta { color: var(--muted); }
.score { font-size: 2.5rem; font-weight: 700; margin: 0.5rem 0; }
.badge { font-size: 0.95rem; padding: 0.15rem 0.7rem; border-radius: 999px; vertical-align: middle; border: 1px solid var(--rule); }
.badge-top { background: #fde68a; color: #78350f; }
.badge-expert { background: #c7d2fe; color: #312e81; }
.badge-learner { background: #d9f99d; color: #365314; }
.hint { color: var(--muted); font-size: 0.85rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border-bottom: 1px solid var(--rule); padding: 0.5rem 0.75rem; text-align: left; vertical-align: top; }
th { font-weight: 600; }
tr.pass { background: var(--right); }
tr.fail { background: var(--wrong); }
.missed-only tr.pass { display: none; }
button { font: inherit; padding: 0.3rem 0.9rem; border: 1px solid var(--accent); border-radius: 6px; background: none; color: var(--accent); cursor: pointer; }
pre { margin: 0; padding: 0.6rem 0.8rem; overflow-x: auto; background: var(--rule); border-radius: 6px; }
code { font-family: ui-monospace, monospace; font-size: 0.85rem; }
details summary { cursor: pointer; color: var(--accent); }
svg { display: block; margin: 0.5rem 0 1.5rem; }
"#;

const JS: &str = r#"
function toggleMissed(button) {
  const table = document.getElementById('results');
  const on = table.classList.toggle('missed-only');
  button.textContent = on ? 'Show all questions' : 'Show missed only';
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_report;

    #[test]
    fn html_report_contains_required_elements() {
        let report = sample_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Rust Basics"));
        assert!(html.contains("50%"));
        assert!(html.contains("Beginner"));
        assert!(html.contains("ownership"));
        assert!(html.contains("(hint used)"));
    }

    #[test]
    fn prompts_are_escaped() {
        let html = generate_html(&sample_report());
        assert!(html.contains("&lt;shared&gt;"));
        assert!(!html.contains("<shared>"));
    }

    #[test]
    fn code_blocks_render_once_each() {
        let html = generate_html(&sample_report());
        let review = html.split("<section class=\"raw-data\">").next().unwrap();
        assert_eq!(review.matches("let ref x = 5;").count(), 1);
        assert_eq!(review.matches("let mut x = 5;").count(), 1);
    }

    #[test]
    fn bar_chart_labels_each_bucket() {
        let mut buckets = BTreeMap::new();
        buckets.insert("traits".to_string(), Bucket { correct: 3, total: 4 });
        buckets.insert("lifetimes".to_string(), Bucket { correct: 0, total: 2 });

        let svg = generate_bar_chart(&buckets);
        assert!(svg.contains("3/4 (75%)"));
        assert!(svg.contains("0/2 (0%)"));
        assert!(svg.contains("#4f46e5"));
        assert!(svg.contains("width=\"0\""));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}

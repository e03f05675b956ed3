//! Attempt reports with JSON persistence and progress comparison.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::{AnswerRecord, AttemptResult, BadgeTier, Bucket, QuizSet};
use crate::review::ReviewItem;
use crate::scoring::score_percent;
use crate::session::Session;

/// A completed attempt, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the bank the questions came from.
    pub bank: BankSummary,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Configured session length in seconds.
    pub duration_secs: i64,
    pub result: AttemptResult,
    pub ledger: Vec<AnswerRecord>,
    /// Per-question review, in display order.
    #[serde(default)]
    pub review: Vec<ReviewItem>,
}

/// Summary of a question bank (without the questions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl BankSummary {
    pub fn of(set: &QuizSet) -> Self {
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            question_count: set.questions.len(),
        }
    }
}

impl AttemptReport {
    /// Snapshot a finished session.
    ///
    /// # Errors
    ///
    /// `ResultUnavailable` unless the session is completed or in review.
    pub fn from_session(session: &Session, bank: BankSummary) -> Result<Self, QuizError> {
        let result = session.result()?.clone();
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank,
            started_at: session.started_at(),
            completed_at: session.completed_at(),
            duration_secs: session.config().duration_secs,
            result,
            ledger: session.ledger().to_vec(),
            review: session.review()?,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Default file name for this report.
    pub fn file_name(&self) -> String {
        format!("attempt-{}.json", self.id)
    }

    /// Compare this attempt against an earlier one.
    ///
    /// Category changes within `threshold` percentage points count as
    /// unchanged.
    pub fn compare(&self, baseline: &AttemptReport, threshold: u32) -> ProgressReport {
        let base = &baseline.result;
        let current = &self.result;

        let names: BTreeSet<&String> = base
            .category_breakdown
            .keys()
            .chain(current.category_breakdown.keys())
            .collect();

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_categories = 0usize;
        let mut removed_categories = 0usize;

        for name in names {
            let before = base.category_breakdown.get(name).copied();
            let after = current.category_breakdown.get(name).copied();
            let (Some(before), Some(after)) = (before, after) else {
                if before.is_none() {
                    new_categories += 1;
                } else {
                    removed_categories += 1;
                }
                continue;
            };

            let delta = CategoryDelta::new(name, before, after);
            if delta.delta < -(threshold as i64) {
                regressions.push(delta);
            } else if delta.delta > threshold as i64 {
                improvements.push(delta);
            } else {
                unchanged += 1;
            }
        }

        ProgressReport {
            baseline_score: base.score_percent,
            current_score: current.score_percent,
            score_delta: i64::from(current.score_percent) - i64::from(base.score_percent),
            baseline_badge: base.badge_tier,
            current_badge: current.badge_tier,
            regressions,
            improvements,
            unchanged,
            new_categories,
            removed_categories,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub baseline_score: u32,
    pub current_score: u32,
    /// Current minus baseline, in percentage points.
    pub score_delta: i64,
    pub baseline_badge: BadgeTier,
    pub current_badge: BadgeTier,
    /// Categories where the hit rate went down.
    pub regressions: Vec<CategoryDelta>,
    /// Categories where the hit rate went up.
    pub improvements: Vec<CategoryDelta>,
    pub unchanged: usize,
    /// Categories in current but not baseline.
    pub new_categories: usize,
    /// Categories in baseline but not current.
    pub removed_categories: usize,
}

/// Hit-rate change for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category: String,
    pub baseline: Bucket,
    pub current: Bucket,
    /// Change in percentage points.
    pub delta: i64,
}

impl CategoryDelta {
    fn new(category: &str, baseline: Bucket, current: Bucket) -> Self {
        let before = i64::from(score_percent(baseline.correct, baseline.total));
        let after = i64::from(score_percent(current.correct, current.total));
        Self {
            category: category.to_string(),
            baseline,
            current,
            delta: after - before,
        }
    }
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let _ = writeln!(
            md,
            "**Score:** {}% → {}% ({:+})",
            self.baseline_score, self.current_score, self.score_delta
        );
        if self.baseline_badge == self.current_badge {
            let _ = writeln!(md, "**Badge:** {}\n", self.current_badge);
        } else {
            let _ = writeln!(md, "**Badge:** {} → {}\n", self.baseline_badge, self.current_badge);
        }
        let _ = writeln!(
            md,
            "**Summary:** {} regressions, {} improvements, {} unchanged\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        );

        for (title, rows) in [("Regressions", &self.regressions), ("Improvements", &self.improvements)] {
            if rows.is_empty() {
                continue;
            }
            let _ = writeln!(md, "### {title}\n");
            md.push_str("| Category | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for d in rows {
                let _ = writeln!(
                    md,
                    "| {} | {}/{} | {}/{} | {:+} |",
                    d.category,
                    d.baseline.correct,
                    d.baseline.total,
                    d.current.correct,
                    d.current.total,
                    d.delta
                );
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if the score or any category went down.
    pub fn has_regressions(&self) -> bool {
        self.score_delta < 0 || !self.regressions.is_empty()
    }

    pub fn badge_improved(&self) -> bool {
        self.current_badge > self.baseline_badge
    }
}

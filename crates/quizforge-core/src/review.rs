//! Review-mode view of a finished attempt.
//!
//! Pairs every sampled question with its ledger record so a host can replay
//! the attempt read-only.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, ChosenValue, QuestionKind, SampledQuestion};

/// Code-blank template rendered with the learner's and the expected fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReview {
    /// Template filled with the chosen value, or `None` if skipped.
    pub answered: Option<String>,
    /// Template filled with the correct answer.
    pub expected: String,
}

/// One question as shown in review mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub position: usize,
    pub question_id: String,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
    pub chosen: ChosenValue,
    pub correct_answer: String,
    pub is_correct: bool,
    pub hint_used: bool,
    pub time_spent_secs: u32,
    pub explanation: String,
    #[serde(default)]
    pub code: Option<CodeReview>,
}

/// Build review items in question order. Questions with no ledger record
/// are left out.
pub fn build_review(order: &[SampledQuestion], ledger: &[AnswerRecord]) -> Vec<ReviewItem> {
    let records: HashMap<&str, &AnswerRecord> =
        ledger.iter().map(|r| (r.question_id.as_str(), r)).collect();

    order
        .iter()
        .filter_map(|sampled| {
            let question = &sampled.question;
            let record = records.get(question.id.as_str())?;
            let correct_answer = question
                .correct_answer
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();

            let code = match question.kind {
                QuestionKind::CodeBlank => question.code_template.as_ref().map(|_| CodeReview {
                    answered: record
                        .chosen
                        .as_answer()
                        .and_then(|value| question.render_template(value)),
                    expected: question.render_template(&correct_answer).unwrap_or_default(),
                }),
                _ => None,
            };

            Some(ReviewItem {
                position: sampled.position,
                question_id: question.id.clone(),
                kind: question.kind,
                prompt: question.prompt.clone(),
                options: question.options.clone(),
                chosen: record.chosen.clone(),
                correct_answer,
                is_correct: record.is_correct,
                hint_used: record.hint_used,
                time_spent_secs: record.time_spent_secs,
                explanation: question.explanation.clone(),
                code,
            })
        })
        .collect()
}

impl ReviewItem {
    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mark = if self.is_correct { "correct" } else { "incorrect" };
        let _ = writeln!(out, "{}. {} [{mark}]", self.position, self.prompt.trim());

        if let Some(code) = &self.code {
            match &code.answered {
                Some(answered) => {
                    let _ = writeln!(out, "   your code:");
                    push_indented(&mut out, answered);
                }
                None => {
                    let _ = writeln!(out, "   your code: (skipped)");
                }
            }
            if !self.is_correct {
                let _ = writeln!(out, "   expected code:");
                push_indented(&mut out, &code.expected);
            }
        } else {
            let _ = writeln!(out, "   your answer: {}", self.chosen);
            if !self.is_correct {
                let _ = writeln!(out, "   correct answer: {}", self.correct_answer);
            }
        }

        if self.hint_used {
            let _ = writeln!(out, "   (hint used)");
        }
        let _ = writeln!(out, "   time: {}s", self.time_spent_secs);
        if !self.explanation.trim().is_empty() {
            let _ = writeln!(out, "   {}", self.explanation.trim());
        }
        out
    }
}

fn push_indented(out: &mut String, block: &str) {
    for line in block.lines() {
        let _ = writeln!(out, "      {line}");
    }
}

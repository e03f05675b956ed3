//! Core data model types for quizforge.
//!
//! Questions and quiz sets are immutable inputs; answer records and attempt
//! results are what a session produces.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder a code-blank template must contain exactly once.
pub const BLANK_TOKEN: &str = "___";

/// Sentinel shown wherever a skipped answer is displayed.
pub const SKIPPED: &str = "SKIPPED";

/// The kind of question being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    CodeBlank,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::TrueFalse => write!(f, "true_false"),
            QuestionKind::CodeBlank => write!(f, "code_blank"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" | "mc" => Ok(QuestionKind::MultipleChoice),
            "true_false" | "tf" => Ok(QuestionKind::TrueFalse),
            "code_blank" | "code" => Ok(QuestionKind::CodeBlank),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The accepted answer for a question.
///
/// `Multiple` is for multi-select questions: the chosen value is a
/// comma-separated list and must name exactly the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl CorrectAnswer {
    /// Whether `value` is exactly the accepted answer.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            CorrectAnswer::Single(expected) => expected == value,
            CorrectAnswer::Multiple(expected) => {
                let chosen: BTreeSet<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect();
                &chosen == expected
            }
        }
    }

    /// Whether `option` is one of the accepted values.
    pub fn contains(&self, option: &str) -> bool {
        match self {
            CorrectAnswer::Single(expected) => expected == option,
            CorrectAnswer::Multiple(expected) => expected.contains(option),
        }
    }
}

impl fmt::Display for CorrectAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectAnswer::Single(value) => write!(f, "{value}"),
            CorrectAnswer::Multiple(values) => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join(", "))
            }
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within its quiz set.
    pub id: String,
    /// Question type.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// The text shown to the learner.
    pub prompt: String,
    /// Ordered answer options (2–6 for choice questions).
    #[serde(default)]
    pub options: Vec<String>,
    /// Accepted answer. Questions without one are left out of sessions.
    #[serde(default)]
    pub correct_answer: Option<CorrectAnswer>,
    /// Explanation shown in review mode.
    #[serde(default)]
    pub explanation: String,
    pub difficulty: Difficulty,
    /// Free-form category label used for breakdowns.
    pub category: String,
    /// Code snippet containing exactly one [`BLANK_TOKEN`].
    #[serde(default)]
    pub code_template: Option<String>,
    /// Authored hint text; derived from the question when absent.
    #[serde(default)]
    pub hint: Option<String>,
}

impl Question {
    /// Whether `value` is the accepted answer. Always `false` when the
    /// question has no correct answer.
    pub fn is_correct(&self, value: &str) -> bool {
        self.correct_answer
            .as_ref()
            .is_some_and(|answer| answer.matches(value))
    }

    /// Render the code template with the blank replaced by `fill`.
    pub fn render_template(&self, fill: &str) -> Option<String> {
        self.code_template
            .as_ref()
            .map(|template| template.replacen(BLANK_TOKEN, fill, 1))
    }
}

/// A question placed in a session, with its 1-based display position.
///
/// The position is presentation-only; the question id never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledQuestion {
    pub position: usize,
    pub question: Question,
}

/// A named collection of questions with optional session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Default number of questions per session.
    #[serde(default)]
    pub sample_size: Option<usize>,
    /// Default session length in seconds.
    #[serde(default)]
    pub duration_secs: Option<i64>,
    /// Entries dropped while loading because they could not be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedQuestion>,
}

/// A bank entry that was left out of its quiz set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedQuestion {
    pub question_id: String,
    pub reason: String,
}

/// What the learner committed for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChosenValue {
    Answer(String),
    Skipped,
}

impl ChosenValue {
    pub fn as_answer(&self) -> Option<&str> {
        match self {
            ChosenValue::Answer(value) => Some(value),
            ChosenValue::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ChosenValue::Skipped)
    }
}

impl fmt::Display for ChosenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChosenValue::Answer(value) => write!(f, "{value}"),
            ChosenValue::Skipped => write!(f, "{SKIPPED}"),
        }
    }
}

/// One committed entry in the session ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub chosen: ChosenValue,
    /// Always `false` for skipped questions.
    pub is_correct: bool,
    pub time_spent_secs: u32,
    pub hint_used: bool,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Active,
    Completed,
    Review,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Active => write!(f, "active"),
            Status::Completed => write!(f, "completed"),
            Status::Review => write!(f, "review"),
        }
    }
}

/// Coarse score bucket awarded at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Beginner,
    Learner,
    Expert,
    Top,
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeTier::Beginner => write!(f, "Beginner"),
            BadgeTier::Learner => write!(f, "Learner"),
            BadgeTier::Expert => write!(f, "Expert"),
            BadgeTier::Top => write!(f, "Top"),
        }
    }
}

/// Correct vs. total answers within one breakdown bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub correct: usize,
    pub total: usize,
}

impl Bucket {
    /// Fraction correct in `[0, 1]`.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Final, immutable outcome of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Rounded half-up percentage in `[0, 100]`.
    pub score_percent: u32,
    pub correct_count: usize,
    pub total_count: usize,
    pub skipped_count: usize,
    pub hints_used: usize,
    /// Sum of per-question time spent.
    pub total_time_secs: u64,
    pub category_breakdown: BTreeMap<String, Bucket>,
    pub difficulty_breakdown: BTreeMap<Difficulty, Bucket>,
    pub badge_tier: BadgeTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(QuestionKind::CodeBlank.to_string(), "code_blank");
        assert_eq!(
            "multiple-choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::MultipleChoice
        );
        assert_eq!("TF".parse::<QuestionKind>().unwrap(), QuestionKind::TrueFalse);
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn difficulty_orders_easy_to_hard() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn multiple_answer_matches_as_a_set() {
        let answer = CorrectAnswer::Multiple(["Vec".to_string(), "String".to_string()].into());
        assert!(answer.matches("String, Vec"));
        assert!(answer.matches("Vec,String"));
        assert!(!answer.matches("Vec"));
        assert!(!answer.matches("Vec, String, Box"));
        assert!(answer.contains("Vec"));
    }

    #[test]
    fn question_without_answer_is_never_correct() {
        let question = Question {
            id: "q".into(),
            kind: QuestionKind::TrueFalse,
            prompt: "?".into(),
            options: vec!["true".into(), "false".into()],
            correct_answer: None,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            category: "misc".into(),
            code_template: None,
            hint: None,
        };
        assert!(!question.is_correct("true"));
    }

    #[test]
    fn template_renders_single_blank() {
        let question = Question {
            id: "q".into(),
            kind: QuestionKind::CodeBlank,
            prompt: "Fill in".into(),
            options: vec![],
            correct_answer: Some(CorrectAnswer::Single("mut".into())),
            explanation: String::new(),
            difficulty: Difficulty::Medium,
            category: "bindings".into(),
            code_template: Some("let ___ x = 5;".into()),
            hint: None,
        };
        assert_eq!(question.render_template("mut").unwrap(), "let mut x = 5;");
    }

    #[test]
    fn chosen_value_serde_and_display() {
        let skipped = serde_json::to_string(&ChosenValue::Skipped).unwrap();
        assert_eq!(skipped, r#"{"kind":"skipped"}"#);
        assert_eq!(ChosenValue::Skipped.to_string(), SKIPPED);

        let answer: ChosenValue =
            serde_json::from_str(r#"{"kind":"answer","value":"42"}"#).unwrap();
        assert_eq!(answer.as_answer(), Some("42"));
    }

    #[test]
    fn badge_tiers_order() {
        assert!(BadgeTier::Top > BadgeTier::Expert);
        assert!(BadgeTier::Learner > BadgeTier::Beginner);
    }
}

//! TOML question bank parser.
//!
//! Loads quiz sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{CorrectAnswer, Difficulty, Question, QuestionKind, QuizSet, RejectedQuestion, BLANK_TOKEN};
use crate::traits::QuestionSource;

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    sample_size: Option<usize>,
    #[serde(default)]
    duration_secs: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Option<CorrectAnswer>,
    #[serde(default)]
    explanation: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    code_template: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_category() -> String {
    "general".to_string()
}

/// Parse a single TOML file into a `QuizSet`.
pub fn parse_question_bank(path: &Path) -> Result<QuizSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuizSet` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuizSet> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = Vec::with_capacity(parsed.questions.len());
    let mut rejected = Vec::new();
    for q in parsed.questions {
        match convert_question(q) {
            Ok(question) => questions.push(question),
            Err(skipped) => {
                tracing::warn!(
                    question_id = %skipped.question_id,
                    bank = %source_path.display(),
                    "skipping question: {}",
                    skipped.reason
                );
                rejected.push(skipped);
            }
        }
    }

    Ok(QuizSet {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        questions,
        sample_size: parsed.bank.sample_size,
        duration_secs: parsed.bank.duration_secs,
        rejected,
    })
}

fn convert_question(q: TomlQuestion) -> std::result::Result<Question, RejectedQuestion> {
    let reject = |reason: String| RejectedQuestion {
        question_id: q.id.clone(),
        reason,
    };
    let kind: QuestionKind = q.kind.parse().map_err(reject)?;
    let difficulty: Difficulty = q.difficulty.parse().map_err(reject)?;

    Ok(Question {
        id: q.id,
        kind,
        prompt: q.prompt,
        options: q.options,
        correct_answer: q.correct_answer,
        explanation: q.explanation,
        difficulty,
        category: q.category,
        code_template: q.code_template,
        hint: q.hint,
    })
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuizSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_bank(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a bank file, or every bank under a directory merged into one set.
pub fn load_banks(path: &Path) -> Result<QuizSet> {
    if !path.is_dir() {
        return parse_question_bank(path);
    }

    let mut sets = load_bank_directory(path)?;
    anyhow::ensure!(!sets.is_empty(), "no question banks found in {}", path.display());
    if sets.len() == 1 {
        return Ok(sets.remove(0));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "banks".to_string());
    let description = sets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ");
    let mut questions = Vec::new();
    let mut rejected = Vec::new();
    for set in sets {
        questions.extend(set.questions);
        rejected.extend(set.rejected);
    }
    Ok(QuizSet {
        id: name.clone(),
        name,
        description,
        questions,
        sample_size: None,
        duration_secs: None,
        rejected,
    })
}

/// A bank file, or a directory of them, on local disk.
#[derive(Debug, Clone)]
pub struct TomlBankSource {
    path: PathBuf,
}

impl TomlBankSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionSource for TomlBankSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_questions(&self) -> Result<QuizSet> {
        load_banks(&self.path)
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz set for common authoring issues.
pub fn validate_question_bank(set: &QuizSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |id: &str, message: String| {
        warnings.push(ValidationWarning {
            question_id: Some(id.to_string()),
            message,
        });
    };

    for skipped in &set.rejected {
        warn(&skipped.question_id, format!("not loaded: {}", skipped.reason));
    }

    let mut seen_ids = HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(q.id.as_str()) {
            warn(&q.id, format!("duplicate question ID: {}", q.id));
        }

        if q.prompt.trim().is_empty() {
            warn(&q.id, "prompt is empty".into());
        }

        let Some(answer) = &q.correct_answer else {
            warn(&q.id, "no correct_answer; question will never be asked".into());
            continue;
        };

        match q.kind {
            QuestionKind::MultipleChoice => {
                if !(2..=6).contains(&q.options.len()) {
                    warn(
                        &q.id,
                        format!("expected 2-6 options, found {}", q.options.len()),
                    );
                }
                let missing: Vec<String> = match answer {
                    CorrectAnswer::Single(value) => vec![value.clone()],
                    CorrectAnswer::Multiple(values) => values.iter().cloned().collect(),
                }
                .into_iter()
                .filter(|value| !q.options.contains(value))
                .collect();
                if !missing.is_empty() {
                    warn(
                        &q.id,
                        format!("correct answer not among options: {}", missing.join(", ")),
                    );
                }
            }
            QuestionKind::TrueFalse => {
                let is_bool_pair = q.options.len() == 2
                    && q.options.iter().any(|o| o == "true")
                    && q.options.iter().any(|o| o == "false");
                if !is_bool_pair {
                    warn(&q.id, "true/false question must have options [\"true\", \"false\"]".into());
                }
                if !matches!(answer, CorrectAnswer::Single(v) if v == "true" || v == "false") {
                    warn(&q.id, format!("correct answer must be true or false, found {answer}"));
                }
            }
            QuestionKind::CodeBlank => match &q.code_template {
                Some(template) => {
                    let blanks = template.matches(BLANK_TOKEN).count();
                    if blanks != 1 {
                        warn(
                            &q.id,
                            format!("code_template must contain exactly one {BLANK_TOKEN}, found {blanks}"),
                        );
                    }
                }
                None => warn(&q.id, "code_blank question has no code_template".into()),
            },
        }
    }

    warnings
}

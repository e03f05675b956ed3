//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::bank::usable_questions;
use quizforge_core::parser::{load_bank_directory, parse_question_bank, validate_question_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let sets = if bank_path.is_dir() {
        load_bank_directory(&bank_path)?
    } else {
        vec![parse_question_bank(&bank_path)?]
    };
    anyhow::ensure!(!sets.is_empty(), "no question banks found in {}", bank_path.display());

    let mut total_warnings = 0;

    for set in &sets {
        let usable = usable_questions(&set.questions).len();
        println!(
            "Bank: {} ({} questions, {} usable)",
            set.name,
            set.questions.len(),
            usable
        );

        let warnings = validate_question_bank(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        if let Some(size) = set.sample_size {
            if size > usable {
                println!("  WARNING: sample_size {size} exceeds {usable} usable questions");
                total_warnings += 1;
            }
        }
        if set.duration_secs.is_some_and(|d| d <= 0) {
            println!("  WARNING: duration_secs must be positive");
            total_warnings += 1;
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

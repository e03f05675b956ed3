//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizforge.toml
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add questions to banks/example.toml");
    println!("  2. Run: quizforge validate --bank banks/example.toml");
    println!("  3. Run: quizforge run --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

default_sample_size = 10
default_duration_secs = 600
results_dir = "./quizforge-results"
tick_millis = 1000
save_results = true
# seed = 42
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
description = "A small bank to get started"
sample_size = 3
duration_secs = 120

[[questions]]
id = "ownership-move"
type = "multiple_choice"
prompt = "What happens to `a` after `let b = a;` when `a` is a String?"
options = ["It is copied", "It is moved", "It is borrowed", "It is dropped"]
correct_answer = "It is moved"
explanation = "String is not Copy, so assignment moves ownership to `b`."
difficulty = "easy"
category = "ownership"

[[questions]]
id = "borrow-rules"
type = "true_false"
prompt = "You may hold any number of shared references or exactly one mutable reference."
options = ["true", "false"]
correct_answer = "true"
explanation = "This is the core borrowing rule. It rules out data races at compile time."
difficulty = "easy"
category = "borrowing"

[[questions]]
id = "mutable-binding"
type = "code_blank"
prompt = "Fill in the blank so the program compiles."
code_template = """
fn main() {
    let ___ count = 0;
    count += 1;
    println!("{count}");
}
"""
correct_answer = "mut"
explanation = "Bindings are immutable unless declared with `mut`."
difficulty = "easy"
category = "bindings"
hint = "A three-letter keyword."
"#;

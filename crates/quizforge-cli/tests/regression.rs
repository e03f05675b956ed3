//! Progress comparison integration tests.
//!
//! Plays attempts through the session engine, persists them as JSON and
//! compares them, both through the library and the `compare` command.

use assert_cmd::Command;
use predicates::prelude::*;

use quizforge_core::config::SessionConfig;
use quizforge_core::model::{CorrectAnswer, Difficulty, Question, QuestionKind};
use quizforge_core::report::{AttemptReport, BankSummary};
use quizforge_core::Session;

fn make_question(id: &str, category: &str) -> Question {
    Question {
        id: id.into(),
        kind: QuestionKind::MultipleChoice,
        prompt: format!("Question {id}"),
        options: vec!["right".into(), "wrong".into()],
        correct_answer: Some(CorrectAnswer::Single("right".into())),
        explanation: String::new(),
        difficulty: Difficulty::Medium,
        category: category.into(),
        code_template: None,
        hint: None,
    }
}

fn pool() -> Vec<Question> {
    vec![
        make_question("own-1", "ownership"),
        make_question("own-2", "ownership"),
        make_question("trait-1", "traits"),
        make_question("trait-2", "traits"),
    ]
}

/// Play a full attempt, answering correctly only the ids in `correct`.
fn play(correct: &[&str]) -> AttemptReport {
    let mut session = Session::create(pool(), SessionConfig::new(4, 300).with_seed(9)).unwrap();
    session.start().unwrap();
    while let Some(current) = session.current_question() {
        let id = current.question.id.clone();
        let value = if correct.contains(&id.as_str()) { "right" } else { "wrong" };
        session.submit(&id, value).unwrap();
    }

    AttemptReport::from_session(
        &session,
        BankSummary {
            id: "progress".into(),
            name: "Progress".into(),
            question_count: 4,
        },
    )
    .unwrap()
}

fn quizforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizforge").unwrap()
}

#[test]
fn detect_regression_when_category_drops() {
    let baseline = play(&["own-1", "own-2", "trait-1", "trait-2"]);
    let current = play(&["trait-1", "trait-2"]);

    let report = current.compare(&baseline, 0);

    assert!(report.has_regressions());
    assert_eq!(report.score_delta, -50);
    assert_eq!(report.regressions.len(), 1);
    assert_eq!(report.regressions[0].category, "ownership");
    assert_eq!(report.regressions[0].delta, -100);
    assert_eq!(report.unchanged, 1);
}

#[test]
fn detect_improvement_and_badge_change() {
    let baseline = play(&["own-1"]);
    let current = play(&["own-1", "own-2", "trait-1", "trait-2"]);

    let report = current.compare(&baseline, 0);

    assert!(!report.has_regressions());
    assert_eq!(report.improvements.len(), 2);
    assert!(report.badge_improved());
    assert_eq!(report.current_score, 100);
}

#[test]
fn no_change_with_identical_attempts() {
    let attempt = play(&["own-1", "trait-1"]);
    let report = attempt.compare(&attempt, 0);

    assert!(!report.has_regressions());
    assert!(report.improvements.is_empty());
    assert_eq!(report.unchanged, 2);
    assert_eq!(report.score_delta, 0);
}

#[test]
fn threshold_controls_sensitivity() {
    let baseline = play(&["own-1", "own-2", "trait-1"]);
    let current = play(&["own-1", "own-2", "trait-2"]);
    assert_eq!(current.compare(&baseline, 0).unchanged, 2);

    let current = play(&["own-1", "trait-1"]);
    assert!(current.compare(&baseline, 10).has_regressions());
    assert_eq!(current.compare(&baseline, 60).regressions.len(), 0);
}

#[test]
fn json_roundtrip_preserves_attempt() {
    let report = play(&["own-1", "trait-2"]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(report.file_name());

    report.save_json(&path).unwrap();
    let loaded = AttemptReport::load_json(&path).unwrap();

    assert_eq!(loaded.id, report.id);
    assert_eq!(loaded.result, report.result);
    assert_eq!(loaded.ledger, report.ledger);
    assert_eq!(loaded.review, report.review);
}

#[test]
fn compare_command_text_and_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    play(&["own-1", "own-2", "trait-1", "trait-2"])
        .save_json(&baseline_path)
        .unwrap();
    play(&["trait-1"]).save_json(&current_path).unwrap();

    quizforge()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100% -> 25% (-75)"))
        .stdout(predicate::str::contains("Badge: Top -> Beginner"))
        .stdout(predicate::str::contains("ownership 2/2 -> 0/2 (-100)"));

    quizforge()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-regression")
        .assert()
        .failure();
}

#[test]
fn compare_command_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    play(&["own-1"]).save_json(&baseline_path).unwrap();
    play(&["own-1", "own-2", "trait-1"]).save_json(&current_path).unwrap();

    quizforge()
        .args(["compare", "--format", "markdown"])
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("### Improvements"))
        .stdout(predicate::str::contains("| traits |"));
}

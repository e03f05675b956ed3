use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::bank::{sample, session_rng};
use quizforge_core::model::{
    AnswerRecord, ChosenValue, CorrectAnswer, Difficulty, Question, QuestionKind, SampledQuestion,
};
use quizforge_core::scoring::{badge_tier, compute_result, score_percent};

fn make_question(i: usize) -> Question {
    Question {
        id: format!("q{i}"),
        kind: QuestionKind::MultipleChoice,
        prompt: format!("Question {i}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: Some(CorrectAnswer::Single("a".into())),
        explanation: String::new(),
        difficulty: match i % 3 {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            _ => Difficulty::Hard,
        },
        category: format!("cat-{}", i % 7),
        code_template: None,
        hint: None,
    }
}

fn make_attempt(n: usize) -> (Vec<SampledQuestion>, Vec<AnswerRecord>) {
    let order: Vec<SampledQuestion> = (0..n)
        .map(|i| SampledQuestion {
            position: i + 1,
            question: make_question(i),
        })
        .collect();
    let ledger = order
        .iter()
        .enumerate()
        .map(|(i, s)| AnswerRecord {
            question_id: s.question.id.clone(),
            chosen: if i % 5 == 0 {
                ChosenValue::Skipped
            } else {
                ChosenValue::Answer("a".into())
            },
            is_correct: i % 5 != 0 && i % 3 != 0,
            time_spent_secs: (i % 30) as u32,
            hint_used: i % 4 == 0,
        })
        .collect();
    (order, ledger)
}

fn bench_score_percent(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_percent");

    group.bench_function("3_of_5", |b| {
        b.iter(|| badge_tier(score_percent(black_box(3), black_box(5))))
    });

    group.bench_function("333_of_1000", |b| {
        b.iter(|| badge_tier(score_percent(black_box(333), black_box(1000))))
    });

    group.finish();
}

fn bench_compute_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_result");

    for n in [10usize, 100, 1000] {
        let (order, ledger) = make_attempt(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| compute_result(black_box(&order), black_box(&ledger)))
        });
    }

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    let pool: Vec<Question> = (0..500).map(make_question).collect();

    group.bench_function("20_of_500", |b| {
        let mut rng = session_rng(Some(7));
        b.iter(|| sample(black_box(&pool), black_box(20), &mut rng))
    });

    group.finish();
}

criterion_group!(benches, bench_score_percent, bench_compute_result, bench_sampling);
criterion_main!(benches);

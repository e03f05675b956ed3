//! Score, breakdown, and badge computation.
//!
//! Everything here is a pure function of the session's question order and
//! ledger, so an attempt result can always be recomputed from those two.

use std::collections::{BTreeMap, HashMap};

use crate::model::{AnswerRecord, AttemptResult, BadgeTier, Bucket, Difficulty, Question, SampledQuestion};

/// Badge thresholds, highest first. Each lower bound is inclusive.
const BADGE_THRESHOLDS: [(u32, BadgeTier); 3] = [
    (90, BadgeTier::Top),
    (75, BadgeTier::Expert),
    (60, BadgeTier::Learner),
];

/// `round(100 * correct / total)` with halves rounded up.
///
/// Returns 0 for an empty session.
pub fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u32
}

/// Badge for a score. A score exactly on a threshold earns the higher tier.
pub fn badge_tier(score: u32) -> BadgeTier {
    BADGE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, tier)| *tier)
        .unwrap_or(BadgeTier::Beginner)
}

fn breakdown_by<K, F>(order: &[SampledQuestion], ledger: &[AnswerRecord], key: F) -> BTreeMap<K, Bucket>
where
    K: Ord,
    F: Fn(&Question) -> K,
{
    let by_id: HashMap<&str, &Question> = order
        .iter()
        .map(|s| (s.question.id.as_str(), &s.question))
        .collect();

    let mut buckets: BTreeMap<K, Bucket> = BTreeMap::new();
    for record in ledger {
        let Some(question) = by_id.get(record.question_id.as_str()) else {
            tracing::warn!(question_id = %record.question_id, "ledger entry for unknown question");
            continue;
        };
        let bucket = buckets.entry(key(question)).or_default();
        bucket.total += 1;
        if record.is_correct {
            bucket.correct += 1;
        }
    }
    buckets
}

/// Correct vs. total per question category. Empty categories are omitted.
pub fn category_breakdown(order: &[SampledQuestion], ledger: &[AnswerRecord]) -> BTreeMap<String, Bucket> {
    breakdown_by(order, ledger, |q| q.category.clone())
}

/// Correct vs. total per difficulty. Empty difficulties are omitted.
pub fn difficulty_breakdown(
    order: &[SampledQuestion],
    ledger: &[AnswerRecord],
) -> BTreeMap<Difficulty, Bucket> {
    breakdown_by(order, ledger, |q| q.difficulty)
}

/// Compute the full attempt result.
///
/// Hint usage is counted but does not reduce the score.
pub fn compute_result(order: &[SampledQuestion], ledger: &[AnswerRecord]) -> AttemptResult {
    let total_count = order.len();
    let correct_count = ledger.iter().filter(|r| r.is_correct).count();
    let score = score_percent(correct_count, total_count);

    AttemptResult {
        score_percent: score,
        correct_count,
        total_count,
        skipped_count: ledger.iter().filter(|r| r.chosen.is_skipped()).count(),
        hints_used: ledger.iter().filter(|r| r.hint_used).count(),
        total_time_secs: ledger.iter().map(|r| u64::from(r.time_spent_secs)).sum(),
        category_breakdown: category_breakdown(order, ledger),
        difficulty_breakdown: difficulty_breakdown(order, ledger),
        badge_tier: badge_tier(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::make_question;
    use crate::model::ChosenValue;

    fn sampled(questions: Vec<Question>) -> Vec<SampledQuestion> {
        questions
            .into_iter()
            .enumerate()
            .map(|(i, question)| SampledQuestion {
                position: i + 1,
                question,
            })
            .collect()
    }

    fn answer(id: &str, value: &str, correct: bool, secs: u32) -> AnswerRecord {
        AnswerRecord {
            question_id: id.into(),
            chosen: ChosenValue::Answer(value.into()),
            is_correct: correct,
            time_spent_secs: secs,
            hint_used: false,
        }
    }

    fn skipped(id: &str) -> AnswerRecord {
        AnswerRecord {
            question_id: id.into(),
            chosen: ChosenValue::Skipped,
            is_correct: false,
            time_spent_secs: 0,
            hint_used: false,
        }
    }

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(score_percent(1, 3), 33);
        assert_eq!(score_percent(2, 3), 67);
        assert_eq!(score_percent(1, 8), 13);
        assert_eq!(score_percent(1, 200), 1);
        assert_eq!(score_percent(0, 5), 0);
        assert_eq!(score_percent(5, 5), 100);
        assert_eq!(score_percent(0, 0), 0);
    }

    #[test]
    fn badge_boundaries_go_to_higher_tier() {
        assert_eq!(badge_tier(100), BadgeTier::Top);
        assert_eq!(badge_tier(90), BadgeTier::Top);
        assert_eq!(badge_tier(89), BadgeTier::Expert);
        assert_eq!(badge_tier(75), BadgeTier::Expert);
        assert_eq!(badge_tier(74), BadgeTier::Learner);
        assert_eq!(badge_tier(60), BadgeTier::Learner);
        assert_eq!(badge_tier(59), BadgeTier::Beginner);
        assert_eq!(badge_tier(0), BadgeTier::Beginner);
    }

    #[test]
    fn three_correct_one_skipped_one_wrong() {
        let order = sampled(vec![
            make_question("a", "x", "ownership", Difficulty::Easy),
            make_question("b", "x", "ownership", Difficulty::Medium),
            make_question("c", "x", "traits", Difficulty::Hard),
            make_question("d", "x", "traits", Difficulty::Easy),
            make_question("e", "x", "lifetimes", Difficulty::Medium),
        ]);
        let ledger = vec![
            answer("a", "x", true, 3),
            answer("b", "x", true, 5),
            answer("c", "x", true, 7),
            skipped("d"),
            answer("e", "wrong-1", false, 2),
        ];

        let result = compute_result(&order, &ledger);
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.total_count, 5);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.score_percent, 60);
        assert_eq!(result.badge_tier, BadgeTier::Learner);
        assert_eq!(result.total_time_secs, 17);

        assert_eq!(result.category_breakdown["ownership"], Bucket { correct: 2, total: 2 });
        assert_eq!(result.category_breakdown["traits"], Bucket { correct: 1, total: 2 });
        assert_eq!(result.category_breakdown["lifetimes"], Bucket { correct: 0, total: 1 });
        assert_eq!(
            result.difficulty_breakdown[&Difficulty::Easy],
            Bucket { correct: 1, total: 2 }
        );
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let order = sampled(vec![
            make_question("a", "x", "ownership", Difficulty::Easy),
            make_question("b", "x", "ownership", Difficulty::Easy),
        ]);
        let ledger = vec![answer("a", "x", true, 1), answer("b", "x", true, 1)];

        let result = compute_result(&order, &ledger);
        assert_eq!(result.category_breakdown.len(), 1);
        assert_eq!(result.difficulty_breakdown.len(), 1);
        assert!(!result.difficulty_breakdown.contains_key(&Difficulty::Hard));
    }

    #[test]
    fn hints_do_not_reduce_score() {
        let order = sampled(vec![make_question("a", "x", "misc", Difficulty::Easy)]);
        let mut record = answer("a", "x", true, 1);
        record.hint_used = true;

        let result = compute_result(&order, &[record]);
        assert_eq!(result.score_percent, 100);
        assert_eq!(result.hints_used, 1);
    }

    #[test]
    fn result_is_reproducible() {
        let order = sampled(vec![
            make_question("a", "x", "misc", Difficulty::Easy),
            make_question("b", "x", "misc", Difficulty::Hard),
        ]);
        let ledger = vec![answer("a", "x", true, 1), skipped("b")];
        assert_eq!(compute_result(&order, &ledger), compute_result(&order, &ledger));
    }
}

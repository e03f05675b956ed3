//! Question pool sampling.
//!
//! A session draws a fixed-size working set from the pool without
//! replacement and in uniformly random order. The random source is always
//! passed in, so a fixed seed reproduces the same ordering.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::QuizError;
use crate::model::{Question, SampledQuestion};

/// Build the random source for a session.
///
/// With a seed the stream is reproducible; without one it is seeded from the
/// thread-local entropy source.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Questions from `pool` that can be used in a session.
///
/// Entries without a correct answer, and repeats of an id already seen, are
/// dropped with a warning.
pub fn usable_questions(pool: &[Question]) -> Vec<&Question> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|q| {
            if q.correct_answer.is_none() {
                tracing::warn!(question_id = %q.id, "question has no correct answer, leaving it out");
                return false;
            }
            if !seen.insert(q.id.as_str()) {
                tracing::warn!(question_id = %q.id, "duplicate question id, keeping the first");
                return false;
            }
            true
        })
        .collect()
}

/// Draw `size` distinct questions from `pool` in random order and label them
/// with display positions `1..=size`.
pub fn sample<R: Rng + ?Sized>(
    pool: &[Question],
    size: usize,
    rng: &mut R,
) -> Result<Vec<SampledQuestion>, QuizError> {
    if size == 0 {
        return Err(QuizError::InvalidSampleSize);
    }

    let mut usable = usable_questions(pool);
    if usable.len() < size {
        return Err(QuizError::InsufficientPool {
            requested: size,
            available: usable.len(),
        });
    }

    // A full shuffle then truncation gives a uniform subset in uniform order.
    usable.shuffle(rng);

    let sampled: Vec<SampledQuestion> = usable
        .into_iter()
        .take(size)
        .enumerate()
        .map(|(i, question)| SampledQuestion {
            position: i + 1,
            question: question.clone(),
        })
        .collect();

    tracing::debug!(size, pool = pool.len(), "sampled session questions");
    Ok(sampled)
}

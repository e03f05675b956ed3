//! Hint text derived from a question.

use crate::model::{CorrectAnswer, Question, QuestionKind};

/// Hint text for `question`.
///
/// An authored hint always wins. Otherwise:
/// - multiple choice rules out half of the wrong options (in option order),
/// - true/false points at the first sentence of the explanation,
/// - code blank reveals the first character and length of the answer.
pub fn derive_hint(question: &Question) -> String {
    if let Some(hint) = question.hint.as_deref().map(str::trim) {
        if !hint.is_empty() {
            return hint.to_string();
        }
    }

    let fallback = || format!("Think about what you know of {}.", question.category);

    match question.kind {
        QuestionKind::MultipleChoice => {
            let Some(answer) = &question.correct_answer else {
                return fallback();
            };
            let wrong: Vec<&str> = question
                .options
                .iter()
                .map(String::as_str)
                .filter(|option| !answer.contains(option))
                .collect();
            let eliminate = wrong.len() / 2;
            if eliminate == 0 {
                return fallback();
            }
            format!("It is not: {}", wrong[..eliminate].join(", "))
        }
        QuestionKind::TrueFalse => question
            .explanation
            .split_inclusive('.')
            .next()
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(|sentence| format!("Consider this: {sentence}"))
            .unwrap_or_else(fallback),
        QuestionKind::CodeBlank => match &question.correct_answer {
            Some(CorrectAnswer::Single(answer)) => match answer.chars().next() {
                Some(first) => format!(
                    "The missing piece starts with '{first}' and is {} characters long.",
                    answer.chars().count()
                ),
                None => fallback(),
            },
            _ => fallback(),
        },
    }
}

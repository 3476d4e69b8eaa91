use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::difficulty::Operator;
use crate::error::{QuizError, QuizResult};
use crate::generator::question::{AnswerChoices, Letter};

const NEAR_OFFSETS: [i64; 10] = [-10, -5, -3, -2, -1, 1, 2, 3, 5, 10];

/// Largest offset that still looks plausible next to an answer of this size.
pub fn offset_limit(correct: i64) -> f64 {
    1.5 * (correct.unsigned_abs() as f64 + 0.5).cbrt() + 1.0
}

/// Every wrong answer worth offering, before dedup and selection.
pub fn candidates<R: Rng + ?Sized>(
    operator: Operator,
    a: i64,
    b: i64,
    correct: i64,
    rng: &mut R,
) -> Vec<i64> {
    let limit = offset_limit(correct);
    let mut out: Vec<i64> = NEAR_OFFSETS
        .iter()
        .filter(|&&off| off.unsigned_abs() as f64 <= limit)
        .map(|&off| correct.saturating_add(off))
        .collect();

    let scaled = correct as f64 * rng.gen_range(0.75..=1.25);
    out.push(scaled.round_ties_even() as i64);

    match operator {
        Operator::Add => out.push(a.saturating_sub(b).saturating_abs()),
        Operator::Sub => out.push(a.saturating_add(b)),
        Operator::Mul => out.extend([
            correct.saturating_sub(a),
            correct.saturating_add(a),
            correct.saturating_sub(b),
            correct.saturating_add(b),
        ]),
        Operator::Div => {
            // Off-by-one divisor, only when it still divides evenly.
            for divisor in [b.saturating_add(1), b.saturating_sub(1)] {
                if divisor != 0 && a % divisor == 0 {
                    out.push(a / divisor);
                }
            }
        }
    }

    out
}

/// Three distinct distractors plus the correct answer, shuffled.
pub fn build_choices<R: Rng + ?Sized>(
    operator: Operator,
    a: i64,
    b: i64,
    correct: i64,
    rng: &mut R,
) -> QuizResult<AnswerChoices> {
    let mut wrong = candidates(operator, a, b, correct, rng);
    wrong.sort_unstable();
    wrong.dedup();
    wrong.retain(|&v| v != correct);
    if wrong.len() < 3 {
        return Err(QuizError::config(format!(
            "only {} distinct distractors for answer {correct}",
            wrong.len()
        )));
    }
    wrong.shuffle(rng);

    let mut values = [wrong[0], wrong[1], wrong[2], correct];
    values.shuffle(rng);
    let position = values
        .iter()
        .position(|&v| v == correct)
        .and_then(Letter::from_index)
        .ok_or_else(|| QuizError::config("correct answer lost while shuffling"))?;

    Ok(AnswerChoices {
        values,
        correct: position,
    })
}

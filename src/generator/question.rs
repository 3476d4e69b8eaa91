use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::engine::difficulty::{DifficultyTemplate, Modifier, OperandRange, Operator, TemplateSet};
use crate::error::{QuizError, QuizResult};
use crate::generator::distractor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn index(self) -> usize {
        match self {
            Letter::A => 0,
            Letter::B => 1,
            Letter::C => 2,
            Letter::D => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn as_char(self) -> char {
        (b'A' + self.index() as u8) as char
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerChoices {
    pub values: [i64; 4],
    pub correct: Letter,
}

impl AnswerChoices {
    pub fn value(&self, letter: Letter) -> i64 {
        self.values[letter.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Letter, i64)> + '_ {
        Letter::ALL.into_iter().zip(self.values.iter().copied())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub operator: Operator,
    pub operands: (i64, i64),
    pub correct_value: i64,
    /// `None` in free-entry mode, where the typed value is compared directly.
    pub choices: Option<AnswerChoices>,
}

impl Question {
    pub fn is_correct_choice(&self, letter: Letter) -> bool {
        self.choices
            .as_ref()
            .is_some_and(|c| c.correct == letter)
    }

    pub fn is_correct_value(&self, value: i128) -> bool {
        value == self.correct_value as i128
    }

    /// The answer as shown on the game-over screen, e.g. `C) 42` or `42`.
    pub fn answer_label(&self) -> String {
        match &self.choices {
            Some(c) => format!("{}) {}", c.correct.as_char(), self.correct_value),
            None => self.correct_value.to_string(),
        }
    }
}

pub fn generate<R: Rng + ?Sized>(
    templates: &TemplateSet,
    free_entry: bool,
    rng: &mut R,
) -> QuizResult<Question> {
    let operator = pick_operator(templates, rng)?;
    let (a, b) = draw_operands(templates.get(operator), rng)?;
    let correct_value = operator.apply(a, b)?;

    let choices = if free_entry {
        None
    } else {
        Some(distractor::build_choices(operator, a, b, correct_value, rng)?)
    };

    Ok(Question {
        prompt: format!("What is {a} {} {b}?", operator.symbol()),
        operator,
        operands: (a, b),
        correct_value,
        choices,
    })
}

fn pick_operator<R: Rng + ?Sized>(templates: &TemplateSet, rng: &mut R) -> QuizResult<Operator> {
    let dist = WeightedIndex::new(templates.weights())
        .map_err(|e| QuizError::config(format!("operator weights: {e}")))?;
    Ok(Operator::ALL[dist.sample(rng)])
}

/// Draws `(a, b)` from the template's ranges and applies its modifier.
pub fn draw_operands<R: Rng + ?Sized>(
    template: &DifficultyTemplate,
    rng: &mut R,
) -> QuizResult<(i64, i64)> {
    let mut a = draw(&template.range1, rng);
    let mut b = draw(&template.range2, rng);

    match template.modifier {
        Modifier::None => {}
        Modifier::Reversed => std::mem::swap(&mut a, &mut b),
        Modifier::GreaterFirst => {
            if b >= a {
                if template.range2.min >= a {
                    return Err(QuizError::config(format!(
                        "g1: no second operand in {}-{} is below {a}",
                        template.range2.min, template.range2.max
                    )));
                }
                b = rng.gen_range(template.range2.min..a);
            }
        }
        Modifier::GreaterSecond => {
            if a >= b {
                if template.range1.min >= b {
                    return Err(QuizError::config(format!(
                        "g2: no first operand in {}-{} is below {b}",
                        template.range1.min, template.range1.max
                    )));
                }
                a = rng.gen_range(template.range1.min..b);
            }
        }
        Modifier::WholeMultiple => {
            if b == 0 {
                return Err(QuizError::config("w1: second operand range includes 0"));
            }
            let quotient = (a as f64 / b as f64).round_ties_even() as i64;
            a = quotient
                .checked_mul(b)
                .ok_or_else(|| QuizError::config("w1: operand overflow"))?;
        }
    }

    Ok((a, b))
}

fn draw<R: Rng + ?Sized>(range: &OperandRange, rng: &mut R) -> i64 {
    rng.gen_range(range.min..=range.max)
}

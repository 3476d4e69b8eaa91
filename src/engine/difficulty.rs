use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{QuizError, QuizResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Template order within a `TemplateSet`.
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '\u{2212}',
            Operator::Mul => '\u{00d7}',
            Operator::Div => '\u{00f7}',
        }
    }

    pub fn index(self) -> usize {
        match self {
            Operator::Add => 0,
            Operator::Sub => 1,
            Operator::Mul => 2,
            Operator::Div => 3,
        }
    }

    /// Integer evaluation. Division must come out exact; the quiz never shows
    /// fractional answers.
    pub fn apply(self, a: i64, b: i64) -> QuizResult<i64> {
        let overflow = || QuizError::config(format!("{a} {} {b} overflows", self.symbol()));
        match self {
            Operator::Add => a.checked_add(b).ok_or_else(overflow),
            Operator::Sub => a.checked_sub(b).ok_or_else(overflow),
            Operator::Mul => a.checked_mul(b).ok_or_else(overflow),
            Operator::Div => {
                if b == 0 {
                    return Err(QuizError::config(format!("{a} \u{00f7} 0 has no answer")));
                }
                if a % b != 0 {
                    return Err(QuizError::config(format!(
                        "{a} \u{00f7} {b} is not a whole number; division templates need the w1 modifier"
                    )));
                }
                Ok(a / b)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandRange {
    pub min: i64,
    pub max: i64,
}

impl OperandRange {
    pub fn new(min: i64, max: i64) -> QuizResult<Self> {
        if min > max {
            return Err(QuizError::config(format!("range {min}-{max} is empty")));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, n: i64) -> bool {
        self.min <= n && n <= self.max
    }
}

impl FromStr for OperandRange {
    type Err = QuizError;

    fn from_str(s: &str) -> QuizResult<Self> {
        let (lo, hi) = s
            .split_once('-')
            .ok_or_else(|| QuizError::config(format!("range `{s}` should look like min-max")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| QuizError::config(format!("range bound `{part}` is not a number")))
        };
        OperandRange::new(parse(lo)?, parse(hi)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    None,
    Reversed,
    GreaterFirst,
    GreaterSecond,
    WholeMultiple,
}

impl FromStr for Modifier {
    type Err = QuizError;

    fn from_str(s: &str) -> QuizResult<Self> {
        match s.trim() {
            "" => Ok(Modifier::None),
            "r" => Ok(Modifier::Reversed),
            "g1" => Ok(Modifier::GreaterFirst),
            "g2" => Ok(Modifier::GreaterSecond),
            "w1" => Ok(Modifier::WholeMultiple),
            other => Err(QuizError::config(format!("unknown modifier `{other}`"))),
        }
    }
}

/// One operator's rule within a tier: how often it is picked and where its
/// operands come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyTemplate {
    pub weight: u32,
    pub range1: OperandRange,
    pub range2: OperandRange,
    pub modifier: Modifier,
}

/// Compact notation: `weight;min-max;min-max;modifier`, e.g. `2;6-15;3-10;g1`.
impl FromStr for DifficultyTemplate {
    type Err = QuizError;

    fn from_str(s: &str) -> QuizResult<Self> {
        let fields: Vec<&str> = s.split(';').collect();
        if fields.len() != 4 {
            return Err(QuizError::config(format!(
                "template `{s}` needs 4 `;`-separated fields, found {}",
                fields.len()
            )));
        }
        let weight = fields[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| QuizError::config(format!("weight `{}` is not a number", fields[0])))?;
        Ok(Self {
            weight,
            range1: fields[1].parse()?,
            range2: fields[2].parse()?,
            modifier: fields[3].parse()?,
        })
    }
}

/// The four operator templates of a tier, in `Operator::ALL` order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateSet {
    templates: [DifficultyTemplate; 4],
}

impl TemplateSet {
    pub fn parse(notations: [&str; 4]) -> QuizResult<Self> {
        let mut parsed = Vec::with_capacity(4);
        for notation in notations {
            parsed.push(notation.parse::<DifficultyTemplate>()?);
        }
        let templates: [DifficultyTemplate; 4] = parsed
            .try_into()
            .map_err(|_| QuizError::config("expected exactly 4 templates"))?;
        Ok(Self { templates })
    }

    pub fn get(&self, op: Operator) -> &DifficultyTemplate {
        &self.templates[op.index()]
    }

    pub fn weights(&self) -> [u32; 4] {
        self.templates.map(|t| t.weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, &DifficultyTemplate)> {
        Operator::ALL.into_iter().zip(self.templates.iter())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Harder,
    Insane,
    Bonus,
    Timed30,
    Timed60,
    Timed120,
}

impl Difficulty {
    pub const ALL: [Difficulty; 9] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Harder,
        Difficulty::Insane,
        Difficulty::Bonus,
        Difficulty::Timed30,
        Difficulty::Timed60,
        Difficulty::Timed120,
    ];

    pub const REGULAR: [Difficulty; 6] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Harder,
        Difficulty::Insane,
        Difficulty::Bonus,
    ];

    pub const TIMED: [Difficulty; 3] = [
        Difficulty::Timed30,
        Difficulty::Timed60,
        Difficulty::Timed120,
    ];

    /// Stable id written to the score log.
    pub fn id(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::Harder => 4,
            Difficulty::Insane => 5,
            Difficulty::Bonus => 6,
            Difficulty::Timed30 => 7,
            Difficulty::Timed60 => 8,
            Difficulty::Timed120 => 9,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Harder => "Harder",
            Difficulty::Insane => "Insane",
            Difficulty::Bonus => "Bonus",
            Difficulty::Timed30 => "30 seconds",
            Difficulty::Timed60 => "1 minute",
            Difficulty::Timed120 => "2 minutes",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Difficulty::Timed30 => "30s",
            Difficulty::Timed60 => "1m",
            Difficulty::Timed120 => "2m",
            _ => self.label(),
        }
    }

    pub fn is_timed(self) -> bool {
        matches!(
            self,
            Difficulty::Timed30 | Difficulty::Timed60 | Difficulty::Timed120
        )
    }

    /// The tier where answers are typed instead of picked.
    pub fn is_free_entry(self) -> bool {
        self == Difficulty::Bonus
    }

    /// Per question for regular tiers, whole session for timed ones.
    pub fn time_budget(self) -> Duration {
        let secs = match self {
            Difficulty::Easy | Difficulty::Normal | Difficulty::Hard => 10,
            Difficulty::Harder | Difficulty::Insane | Difficulty::Bonus => 8,
            Difficulty::Timed30 => 30,
            Difficulty::Timed60 => 60,
            Difficulty::Timed120 => 120,
        };
        Duration::from_secs(secs)
    }

    /// Timed tiers flow straight into the next question after a correct answer.
    pub fn pauses_after_correct(self) -> bool {
        !self.is_timed()
    }

    fn template_notation(self) -> [&'static str; 4] {
        match self {
            Difficulty::Easy => ["3;3-7;3-10;r", "2;6-15;3-10;g1", "0;0-0;0-0;", "0;0-0;0-0;"],
            Difficulty::Normal => [
                "2;5-11;5-13;r",
                "3;10-20;5-15;g1",
                "3;2-8;4-10;r",
                "0;0-0;0-0;",
            ],
            Difficulty::Hard => [
                "3;7-18;10-25;r",
                "3;20-35;8-28;g1",
                "6;3-10;7-12;r",
                "2;10-25;3-6;w1",
            ],
            Difficulty::Harder => [
                "2;10-25;15-40;r",
                "2;25-55;12-40;g1",
                "5;4-12;8-16;r",
                "2;18-50;5-9;w1",
            ],
            Difficulty::Insane => [
                "2;17-40;25-75;r",
                "2;30-85;15-60;g1",
                "7;5-15;10-20;r",
                "3;30-90;7-12;w1",
            ],
            Difficulty::Bonus => [
                "2;30-100;50-150;r",
                "2;100-200;50-125;g1",
                "7;8-20;15-25;r",
                "4;60-175;9-16;w1",
            ],
            Difficulty::Timed30 | Difficulty::Timed60 | Difficulty::Timed120 => {
                ["4;7-18;10-25;r", "4;20-35;8-28;g1", "7;3-10;7-12;r", "3;15-45;3-9;w1"]
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parsed template sets for every tier. Built once at startup.
#[derive(Clone, Debug)]
pub struct DifficultyCatalog {
    sets: Vec<(Difficulty, TemplateSet)>,
}

impl DifficultyCatalog {
    pub fn builtin() -> QuizResult<Self> {
        let mut sets = Vec::with_capacity(Difficulty::ALL.len());
        for difficulty in Difficulty::ALL {
            let set = TemplateSet::parse(difficulty.template_notation()).map_err(|e| {
                QuizError::config(format!("{difficulty}: {e}"))
            })?;
            sets.push((difficulty, set));
        }
        Ok(Self { sets })
    }

    pub fn templates(&self, difficulty: Difficulty) -> &TemplateSet {
        // `builtin` fills every tier, in `Difficulty::ALL` order.
        &self.sets[difficulty as usize].1
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::engine::difficulty::Difficulty;

/// One finished session, as stored in the score log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreRecord {
    pub timestamp: i64,
    pub difficulty_id: u32,
    pub points: u32,
}

impl ScoreRecord {
    pub fn new(timestamp: i64, difficulty: Difficulty, points: u32) -> Self {
        Self {
            timestamp,
            difficulty_id: difficulty.id(),
            points,
        }
    }

    pub fn now(difficulty: Difficulty, points: u32) -> Self {
        Self::new(Utc::now().timestamp(), difficulty, points)
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::from_id(self.difficulty_id)
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// `<epochSeconds> <difficultyId> <finalPoints>`
impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.timestamp, self.difficulty_id, self.points)
    }
}

impl FromStr for ScoreRecord {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(' ').collect();
        if fields.len() != 3 {
            return Err(format!("expected 3 fields, found {}", fields.len()));
        }
        let timestamp = fields[0]
            .parse::<i64>()
            .map_err(|_| format!("bad timestamp `{}`", fields[0]))?;
        let difficulty_id = fields[1]
            .parse::<u32>()
            .map_err(|_| format!("bad difficulty `{}`", fields[1]))?;
        let points = fields[2]
            .parse::<u32>()
            .map_err(|_| format!("bad points `{}`", fields[2]))?;
        Ok(Self {
            timestamp,
            difficulty_id,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let r = ScoreRecord::new(1_706_745_600, Difficulty::Hard, 17);
        assert_eq!(r.to_string(), "1706745600 3 17");
        assert_eq!("1706745600 3 17".parse::<ScoreRecord>().unwrap(), r);
    }

    #[test]
    fn test_rejects_garbled_lines() {
        for bad in ["", "1 2", "1 2 3 4", "a 2 3", "1 b 3", "1 2 -3", "1  2 3"] {
            assert!(bad.parse::<ScoreRecord>().is_err(), "accepted `{bad}`");
        }
    }

    #[test]
    fn test_unknown_difficulty_is_kept_opaque() {
        let r: ScoreRecord = "5 42 1".parse().unwrap();
        assert_eq!(r.difficulty(), None);
        assert_eq!(r.difficulty_id, 42);

        let r: ScoreRecord = "5 300 1".parse().unwrap();
        assert_eq!(r.difficulty(), None);
        assert_eq!(r.difficulty_id, 300);
    }

    #[test]
    fn test_finished_at() {
        let r = ScoreRecord::new(0, Difficulty::Easy, 0);
        assert_eq!(r.finished_at().unwrap().timestamp(), 0);
    }
}

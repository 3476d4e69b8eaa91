use crate::session::result::ScoreRecord;

/// Attempts shown per statistics page.
pub const PAGE_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    HighScores,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Newest => SortOrder::HighScores,
            SortOrder::HighScores => SortOrder::Newest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::HighScores => "High Scores",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyStats {
    pub difficulty_id: u32,
    pub records: Vec<ScoreRecord>,
    pub count: usize,
    /// Already rounded for display; `None` when there are no attempts.
    pub average: Option<f64>,
    pub max: Option<u32>,
}

impl DifficultyStats {
    pub fn from_records<'a>(
        difficulty_id: u32,
        all: impl IntoIterator<Item = &'a ScoreRecord>,
    ) -> Self {
        let records: Vec<ScoreRecord> = all
            .into_iter()
            .filter(|r| r.difficulty_id == difficulty_id)
            .copied()
            .collect();
        let count = records.len();
        let max = records.iter().map(|r| r.points).max();
        let average = if count == 0 {
            None
        } else {
            let sum: u64 = records.iter().map(|r| r.points as u64).sum();
            Some(round_average(sum as f64 / count as f64))
        };
        Self {
            difficulty_id,
            records,
            count,
            average,
            max,
        }
    }

    pub fn average_label(&self) -> String {
        format_average(self.average)
    }

    pub fn max_label(&self) -> String {
        self.max.map_or_else(|| "N/A".to_string(), |m| m.to_string())
    }

    pub fn sorted(&self, order: SortOrder) -> Vec<ScoreRecord> {
        let mut out = self.records.clone();
        match order {
            SortOrder::Newest => out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::HighScores => out.sort_by(|a, b| b.points.cmp(&a.points)),
        }
        out
    }

    /// Always at least one page, even when empty.
    pub fn page_count(&self) -> usize {
        self.count.div_ceil(PAGE_SIZE).max(1)
    }

    pub fn page(&self, order: SortOrder, page: usize) -> Vec<ScoreRecord> {
        self.sorted(order)
            .into_iter()
            .skip(page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }
}

/// Three decimals below 10, two below 100, one otherwise.
pub fn round_average(avg: f64) -> f64 {
    if avg.fract() == 0.0 {
        return avg;
    }
    let scale = if avg < 9.9995 {
        1000.0
    } else if avg < 99.995 {
        100.0
    } else {
        10.0
    };
    (avg * scale).round() / scale
}

pub fn format_average(avg: Option<f64>) -> String {
    match avg {
        None => "N/A".to_string(),
        Some(a) if a.fract() == 0.0 => format!("{}", a as i64),
        Some(a) => format!("{a}"),
    }
}

/// Relative label for an attempt, e.g. `3m 20s ago` or `2d ago`.
pub fn time_ago(secs: i64) -> String {
    let s = secs.max(0);
    if s < 60 {
        format!("{s}s ago")
    } else if s < 3_600 {
        if s % 60 == 0 {
            format!("{}m ago", s / 60)
        } else {
            format!("{}m {}s ago", s / 60, s % 60)
        }
    } else if s < 86_400 {
        if s % 3_600 < 60 {
            format!("{}h ago", s / 3_600)
        } else {
            format!("{}h {}m ago", s / 3_600, (s / 60) % 60)
        }
    } else if s < 8_640_000 {
        if s % 86_400 < 3_600 {
            format!("{}d ago", s / 86_400)
        } else {
            format!("{}d {}h ago", s / 86_400, (s / 3_600) % 24)
        }
    } else {
        format!("{}d ago", s / 86_400)
    }
}

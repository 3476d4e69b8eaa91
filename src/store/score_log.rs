use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::difficulty::Difficulty;
use crate::error::{QuizError, QuizResult};
use crate::session::quiz::ScoreSink;
use crate::session::result::ScoreRecord;
use crate::store::stats::DifficultyStats;
use crate::store::{LineFile, SCORES_FILE};

/// Append-only score log, mirrored in memory so queries see every append.
pub struct ScoreStore {
    path: PathBuf,
    file: LineFile,
    records: Vec<ScoreRecord>,
}

impl ScoreStore {
    pub fn open(data_dir: &Path) -> QuizResult<Self> {
        Self::open_file(data_dir.join(SCORES_FILE))
    }

    pub fn open_file(path: PathBuf) -> QuizResult<Self> {
        let (file, lines) = LineFile::open(&path)?;
        let mut records = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = line.parse::<ScoreRecord>().map_err(|reason| {
                // Header is line 1.
                warn!(path = %path.display(), line = i + 2, %reason, "unreadable score record");
                QuizError::integrity(&path, format!("line {}: {reason}", i + 2))
            })?;
            records.push(record);
        }
        info!(path = %path.display(), records = records.len(), "score log opened");
        Ok(Self {
            path,
            file,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: ScoreRecord) -> QuizResult<()> {
        self.file.append_line(&record.to_string())?;
        self.records.push(record);
        info!(
            difficulty = record.difficulty_id,
            points = record.points,
            "score recorded"
        );
        Ok(())
    }

    /// Every record, in write order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn query(&self, difficulty: Difficulty) -> DifficultyStats {
        DifficultyStats::from_records(difficulty.id(), &self.records)
    }
}

impl ScoreSink for ScoreStore {
    fn append(&mut self, record: ScoreRecord) -> QuizResult<()> {
        ScoreStore::append(self, record)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::store::FILE_HEADER;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, ScoreStore) {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_append_then_query() {
        let (_dir, mut store) = make_test_store();
        for (ts, pts) in [(100, 4), (200, 9), (300, 2)] {
            store.append(ScoreRecord::new(ts, Difficulty::Hard, pts)).unwrap();
        }
        store.append(ScoreRecord::new(400, Difficulty::Easy, 50)).unwrap();

        let stats = store.query(Difficulty::Hard);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average, Some(5.0));
        assert_eq!(stats.max, Some(9));
        assert_eq!(store.query(Difficulty::Timed60).count, 0);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = ScoreStore::open(dir.path()).unwrap();
            store.append(ScoreRecord::new(1_700_000_000, Difficulty::Timed30, 14)).unwrap();
            store.append(ScoreRecord::new(1_600_000_000, Difficulty::Timed30, 3)).unwrap();
        }
        let content = fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap();
        assert_eq!(
            content,
            format!("{FILE_HEADER}\n1700000000 7 14\n1600000000 7 3\n")
        );

        let store = ScoreStore::open(dir.path()).unwrap();
        // Write order is kept even though the clock went backwards.
        assert_eq!(store.records()[0].timestamp, 1_700_000_000);
        assert_eq!(store.records()[1].timestamp, 1_600_000_000);
        assert_eq!(store.query(Difficulty::Timed30).max, Some(14));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SCORES_FILE),
            format!("{FILE_HEADER}\n10 1 2\n\n20 1 4\n"),
        )
        .unwrap();
        let store = ScoreStore::open(dir.path()).unwrap();
        assert_eq!(store.query(Difficulty::Easy).count, 2);
    }

    #[test]
    fn test_unknown_ids_are_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SCORES_FILE),
            format!("{FILE_HEADER}\n10 1 2\n20 300 7\n"),
        )
        .unwrap();
        let store = ScoreStore::open(dir.path()).unwrap();
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.records()[1].difficulty_id, 300);
        assert_eq!(store.query(Difficulty::Easy).count, 1);
    }

    #[test]
    fn test_garbled_record_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SCORES_FILE);
        let before = format!("{FILE_HEADER}\n10 1 2\nnot a record\n");
        fs::write(&path, &before).unwrap();
        let err = ScoreStore::open(dir.path()).err().unwrap();
        match err {
            QuizError::StoreIntegrity { reason, .. } => assert!(reason.starts_with("line 3")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_foreign_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SCORES_FILE), "my shopping list\n").unwrap();
        assert!(matches!(
            ScoreStore::open(dir.path()),
            Err(QuizError::StoreIntegrity { .. })
        ));
    }
}

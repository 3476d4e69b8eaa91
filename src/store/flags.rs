use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::QuizResult;
use crate::store::{FLAGS_FILE, LineFile};

pub const BONUS_UNLOCKED: &str = "bonusDifficultyUnlocked";
/// Name older versions of the game wrote for the same flag.
const LEGACY_BONUS_UNLOCKED: &str = "AAAAAAAUnlocked";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnlockFlags {
    pub bonus_difficulty_unlocked: bool,
}

/// Line-per-flag file. Flags are only ever added.
pub struct FlagStore {
    path: PathBuf,
    file: LineFile,
    flags: BTreeSet<String>,
}

impl FlagStore {
    pub fn open(data_dir: &Path) -> QuizResult<Self> {
        let path = data_dir.join(FLAGS_FILE);
        let (file, lines) = LineFile::open(&path)?;
        let flags = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect::<BTreeSet<String>>();
        info!(path = %path.display(), flags = flags.len(), "flags file opened");
        Ok(Self { path, file, flags })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Returns true if the flag was newly written.
    pub fn set(&mut self, name: &str) -> QuizResult<bool> {
        if self.is_set(name) {
            return Ok(false);
        }
        self.file.append_line(name)?;
        self.flags.insert(name.to_string());
        info!(flag = name, "flag set");
        Ok(true)
    }

    pub fn unlock_flags(&self) -> UnlockFlags {
        UnlockFlags {
            bonus_difficulty_unlocked: self.bonus_unlocked(),
        }
    }

    pub fn bonus_unlocked(&self) -> bool {
        self.is_set(BONUS_UNLOCKED) || self.is_set(LEGACY_BONUS_UNLOCKED)
    }

    pub fn unlock_bonus(&mut self) -> QuizResult<bool> {
        if self.bonus_unlocked() {
            return Ok(false);
        }
        self.set(BONUS_UNLOCKED)
    }
}

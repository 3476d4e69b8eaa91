pub mod flags;
pub mod score_log;
pub mod stats;

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{QuizError, QuizResult};

/// First line of every file this game writes.
pub const FILE_HEADER: &str = "# Belongs to the game Math Quizzer.";

pub const SCORES_FILE: &str = "MATHQUIZZER-highscores.txt";
pub const FLAGS_FILE: &str = "MATHQUIZZER-other.txt";

/// Fails unless `first_line` is exactly [`FILE_HEADER`].
pub fn validate_header(path: &Path, first_line: Option<&str>) -> QuizResult<()> {
    match first_line {
        Some(first) if first == FILE_HEADER => Ok(()),
        Some(_) => Err(QuizError::integrity(path, "unexpected header line")),
        None => Err(QuizError::integrity(path, "missing header line")),
    }
}

/// An append-only line file that has passed the header check.
pub(crate) struct LineFile {
    file: File,
    needs_newline: bool,
}

impl LineFile {
    /// Opens `path`, creating it with just the header if absent. Returns the
    /// handle and every line after the header.
    pub(crate) fn open(path: &Path) -> QuizResult<(Self, Vec<String>)> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(path)?;
            writeln!(file, "{FILE_HEADER}")?;
            file.sync_all()?;
            info!(path = %path.display(), "created store file");
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => QuizError::integrity(path, "not valid UTF-8"),
            _ => QuizError::Io(e),
        })?;
        let mut lines = content.lines();
        validate_header(path, lines.next())?;
        let body: Vec<String> = lines.map(str::to_string).collect();

        let file = OpenOptions::new().append(true).open(path)?;
        Ok((
            Self {
                file,
                needs_newline: !content.ends_with('\n'),
            },
            body,
        ))
    }

    pub(crate) fn append_line(&mut self, line: &str) -> QuizResult<()> {
        if self.needs_newline {
            self.file.write_all(b"\n")?;
            self.needs_newline = false;
        }
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_header() {
        let p = Path::new("x.txt");
        assert!(validate_header(p, Some(FILE_HEADER)).is_ok());
        assert!(validate_header(p, Some("# Belongs to the game Math Quizzer")).is_err());
        assert!(validate_header(p, None).is_err());
    }

    #[test]
    fn test_creates_missing_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("f.txt");
        let (_, body) = LineFile::open(&path).unwrap();
        assert!(body.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{FILE_HEADER}\n"));
    }

    #[test]
    fn test_bad_header_is_integrity_error_and_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "1 2 3\n").unwrap();
        let err = LineFile::open(&path).err().unwrap();
        assert!(matches!(err, QuizError::StoreIntegrity { .. }));
        assert!(err.to_string().contains("rename the file"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 2 3\n");
    }

    #[test]
    fn test_empty_file_is_integrity_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            LineFile::open(&path),
            Err(QuizError::StoreIntegrity { .. })
        ));
    }

    #[test]
    fn test_append_after_missing_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, format!("{FILE_HEADER}\nabc")).unwrap();
        let (mut lf, body) = LineFile::open(&path).unwrap();
        assert_eq!(body, vec!["abc".to_string()]);
        lf.append_line("def").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{FILE_HEADER}\nabc\ndef\n")
        );
    }
}

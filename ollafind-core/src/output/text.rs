//! Line-oriented log of exposed endpoints
//!
//! Each finding is a block: the URL, one line per model entry, then a
//! dashed separator and a blank line.

use crate::output::common::AppendFile;
use crate::types::ModelEntry;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Separator written after every block
pub const BLOCK_SEPARATOR: &str = "---------------------------------------";

/// Size and record count of a [`TextLog`] at some point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMark {
    len: Option<u64>,
    records: usize,
}

/// Line-log sink
///
/// The file is only created by the first block, so a run without
/// findings leaves nothing behind.
#[derive(Debug, Clone)]
pub struct TextLog {
    file: AppendFile,
    records: usize,
}

impl TextLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AppendFile::new(path),
            records: 0,
        }
    }

    /// Appends one block for `url`
    pub fn write_block(&mut self, url: &str, models: &[ModelEntry]) -> io::Result<()> {
        let mut block = String::new();
        block.push_str(url);
        block.push('\n');
        for model in models {
            block.push_str(&model.to_log_line());
            block.push('\n');
        }
        block.push_str(BLOCK_SEPARATOR);
        block.push_str("\n\n");

        self.file.append(&block)?;
        self.records += models.len();
        Ok(())
    }

    /// Current end of the log, for [`TextLog::rollback`]
    pub fn mark(&self) -> TextMark {
        TextMark {
            len: fs::metadata(self.path()).ok().map(|m| m.len()),
            records: self.records,
        }
    }

    /// Undoes every block written since `mark`
    ///
    /// A log that did not exist at `mark` is removed again.
    pub fn rollback(&mut self, mark: TextMark) -> io::Result<()> {
        match mark.len {
            Some(len) => OpenOptions::new()
                .write(true)
                .open(self.path())?
                .set_len(len)?,
            None => {
                if self.file.exists() {
                    fs::remove_file(self.path())?;
                }
            }
        }
        self.records = mark.records;
        Ok(())
    }

    /// Model entries written so far
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_block_layout() {
        let dir = tempdir().unwrap();
        let mut log = TextLog::new(dir.path().join("run.txt"));

        log.write_block(
            "http://1.2.3.4:11434",
            &[ModelEntry::new("a"), ModelEntry::new("b")],
        )
        .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "http://1.2.3.4:11434\n{\"name\":\"a\"}\n{\"name\":\"b\"}\n---------------------------------------\n\n"
        );
        assert_eq!(log.records(), 2);
    }

    #[test]
    fn test_blocks_accumulate() {
        let dir = tempdir().unwrap();
        let mut log = TextLog::new(dir.path().join("run.txt"));

        log.write_block("http://a", &[ModelEntry::new("x")]).unwrap();
        log.write_block("http://b", &[ModelEntry::new("y")]).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches(BLOCK_SEPARATOR).count(), 2);
        assert!(content.find("http://a").unwrap() < content.find("http://b").unwrap());
    }

    #[test]
    fn test_rollback_restores_previous_content() {
        let dir = tempdir().unwrap();
        let mut log = TextLog::new(dir.path().join("run.txt"));
        log.write_block("http://a", &[ModelEntry::new("x")]).unwrap();
        let before = std::fs::read_to_string(log.path()).unwrap();

        let mark = log.mark();
        log.write_block("http://b", &[ModelEntry::new("y"), ModelEntry::new("z")])
            .unwrap();
        log.rollback(mark).unwrap();

        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), before);
        assert_eq!(log.records(), 1);
    }

    #[test]
    fn test_rollback_of_first_block_removes_file() {
        let dir = tempdir().unwrap();
        let mut log = TextLog::new(dir.path().join("run.txt"));

        let mark = log.mark();
        log.write_block("http://a", &[ModelEntry::new("x")]).unwrap();
        log.rollback(mark).unwrap();

        assert!(!log.path().exists());
        assert_eq!(log.records(), 0);
    }

    #[test]
    fn test_not_created_until_written() {
        let dir = tempdir().unwrap();
        let log = TextLog::new(dir.path().join("run.txt"));
        assert!(!log.path().exists());
        assert_eq!(log.records(), 0);
    }
}

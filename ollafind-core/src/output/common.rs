//! Common utilities for the output sinks

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Format of the run stamp before separators are normalised
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only file that is opened and closed around every write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendFile {
    path: PathBuf,
}

impl AppendFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends `s`, creating the file if needed
    pub fn append(&self, s: &str) -> io::Result<()> {
        self.append_bytes(s.as_bytes())
    }

    pub fn append_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Formats a run stamp such as `2025_02_28_19_15_31`
///
/// Every non-alphanumeric separator of `%Y-%m-%d %H:%M:%S` becomes `_`.
pub fn run_stamp(time: DateTime<Local>) -> String {
    time.format(STAMP_FORMAT)
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Picks a stem under `dir` for which none of `extensions` exists yet
///
/// Returns `stamp` itself when it is free, otherwise `stamp_1`, `stamp_2`, …
pub fn unique_stem(dir: &Path, stamp: &str, extensions: &[&str]) -> String {
    let taken = |stem: &str| {
        extensions
            .iter()
            .any(|ext| dir.join(format!("{}.{}", stem, ext)).exists())
    };

    if !taken(stamp) {
        return stamp.to_string();
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}_{}", stamp, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_run_stamp_format() {
        let time = Local.with_ymd_and_hms(2025, 2, 28, 19, 15, 31).unwrap();
        assert_eq!(run_stamp(time), "2025_02_28_19_15_31");
    }

    #[test]
    fn test_run_stamp_is_filename_safe() {
        let stamp = run_stamp(Local::now());
        assert!(stamp.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert_eq!(stamp.len(), 19);
    }

    #[test]
    fn test_append_file_appends() {
        let dir = tempdir().unwrap();
        let file = AppendFile::new(dir.path().join("out.txt"));
        assert!(!file.exists());

        file.append("one\n").unwrap();
        file.append("two\n").unwrap();

        assert!(file.exists());
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }

    #[test]
    fn test_unique_stem_free() {
        let dir = tempdir().unwrap();
        assert_eq!(unique_stem(dir.path(), "stamp", &["txt", "csv"]), "stamp");
    }

    #[test]
    fn test_unique_stem_skips_existing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("stamp.csv"), "").unwrap();
        std::fs::write(dir.path().join("stamp_1.txt"), "").unwrap();

        assert_eq!(unique_stem(dir.path(), "stamp", &["txt", "csv"]), "stamp_2");
    }
}

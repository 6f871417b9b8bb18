//! Output sinks for probe findings
//!
//! A run writes to two append-only files that share a stem derived from
//! the run's start time:
//!
//! - **Text** - `<stamp>.txt`, one block per exposed endpoint
//! - **CSV** - `<stamp>.csv`, one `IP,URL,模型名称` row per model
//!
//! # Examples
//!
//! ```no_run
//! use ollafind_core::output::RunOutputs;
//! use ollafind_core::types::ModelEntry;
//!
//! let mut outputs = RunOutputs::create(".", chrono::Local::now())?;
//! outputs.write_finding("http://1.2.3.4:11434", &[ModelEntry::new("llama3")])?;
//! # Ok::<(), ollafind_core::Error>(())
//! ```

pub mod common;
pub mod table;
pub mod text;

pub use common::{run_stamp, unique_stem, AppendFile};
pub use table::CsvTable;
pub use text::TextLog;

use crate::error::{Error, Result};
use crate::types::{ModelEntry, ProbeRecord};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The pair of sinks written by one run
///
/// File names are fixed when the value is created; the CSV header is
/// written immediately, the text log on the first finding.
#[derive(Debug)]
pub struct RunOutputs {
    text: TextLog,
    table: CsvTable,
}

impl RunOutputs {
    /// Creates the sinks under `dir`, named after `started`
    pub fn create(dir: impl AsRef<Path>, started: DateTime<Local>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let stem = unique_stem(dir, &run_stamp(started), &["txt", "csv"]);
        let text = TextLog::new(dir.join(format!("{}.txt", stem)));
        let table = CsvTable::create(dir.join(format!("{}.csv", stem)))?;

        Ok(Self { text, table })
    }

    /// Records every model of one exposed endpoint in both sinks
    ///
    /// Returns the records written. An empty `models` slice writes nothing.
    pub fn write_finding(&mut self, url: &str, models: &[ModelEntry]) -> Result<Vec<ProbeRecord>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let records = ProbeRecord::from_models(url, models);
        let mark = self.text.mark();
        let written = self
            .text
            .write_block(url, models)
            .map_err(Error::from)
            .and_then(|()| self.table.write_records(&records));

        if let Err(e) = written {
            // Both sinks must hold the same records
            if let Err(undo) = self.text.rollback(mark) {
                debug!(%url, error = %undo, "failed to roll back text log");
            }
            return Err(e);
        }
        Ok(records)
    }

    pub fn text_path(&self) -> &Path {
        self.text.path()
    }

    pub fn csv_path(&self) -> &Path {
        self.table.path()
    }

    /// Data rows in the CSV sink
    pub fn rows_written(&self) -> usize {
        self.table.rows()
    }

    /// Paths of the sinks that received at least one record
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if self.text.records() > 0 {
            paths.push(self.text.path().to_path_buf());
        }
        if self.table.rows() > 0 {
            paths.push(self.table.path().to_path_buf());
        }
        paths
    }
}

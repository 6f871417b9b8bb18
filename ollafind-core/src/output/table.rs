//! CSV table of discovered models

use crate::error::{Error, Result};
use crate::output::common::AppendFile;
use crate::types::ProbeRecord;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};

/// Header row: host, url, model name
pub const CSV_HEADER: [&str; 3] = ["IP", "URL", "模型名称"];

/// Tabular sink, one row per model
#[derive(Debug, Clone)]
pub struct CsvTable {
    file: AppendFile,
    rows: usize,
}

impl CsvTable {
    /// Creates the file and writes the header row
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let table = Self {
            file: AppendFile::new(path),
            rows: 0,
        };
        table.append_rows(std::iter::once(CSV_HEADER.map(String::from)))?;
        Ok(table)
    }

    /// Appends one row per record
    pub fn write_records(&mut self, records: &[ProbeRecord]) -> Result<()> {
        self.append_rows(
            records
                .iter()
                .map(|r| [r.host.clone(), r.url.clone(), r.model_name.clone()]),
        )?;
        self.rows += records.len();
        Ok(())
    }

    /// Data rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn append_rows<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = [String; 3]>,
    {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(vec![]);
        for row in rows {
            wtr.write_record(&row)?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        self.file.append_bytes(&data)?;
        Ok(())
    }
}

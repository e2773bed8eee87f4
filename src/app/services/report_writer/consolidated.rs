//! Streaming writer for the consolidated export
//!
//! Rows are appended as soon as they are joined; nothing is buffered beyond
//! the underlying `csv` writer's I/O buffer.

use crate::app::models::JoinedExpenseRow;
use crate::constants::{CANONICAL_DELIMITER, CONSOLIDATED_HEADER};
use crate::{Error, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Consolidated export writer
pub struct ConsolidatedWriter<W: Write> {
    writer: csv::Writer<W>,
    target: String,
    rows_written: u64,
}

impl ConsolidatedWriter<File> {
    /// Create (or truncate) the export file and write its header
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            Error::io(format!("Failed to create consolidated export {}", path.display()), e)
        })?;
        Self::new(file, &path.display().to_string())
    }
}

impl<W: Write> ConsolidatedWriter<W> {
    /// Wrap any writer and emit the header line
    pub fn new(inner: W, target: &str) -> Result<Self> {
        let mut writer = WriterBuilder::new()
            .delimiter(CANONICAL_DELIMITER)
            .from_writer(inner);

        writer.write_record(CONSOLIDATED_HEADER).map_err(|e| {
            Error::csv_parsing(target, "Failed to write consolidated header", Some(e))
        })?;

        debug!("Consolidated export opened: {}", target);

        Ok(Self {
            writer,
            target: target.to_string(),
            rows_written: 0,
        })
    }

    /// Append one row
    pub fn write_row(&mut self, row: &JoinedExpenseRow) -> Result<()> {
        self.writer.write_record(row.to_record()).map_err(|e| {
            Error::csv_parsing(&self.target, "Failed to write consolidated row", Some(e))
        })?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush buffered rows to the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to flush {}", self.target), e))
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        let target = self.target;
        self.writer
            .into_inner()
            .map_err(|e| Error::io(format!("Failed to finish {}", target), e.into_error()))
    }
}

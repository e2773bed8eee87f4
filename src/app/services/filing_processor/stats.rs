//! Processing statistics for the filter-join stage
//!
//! These counters are the soft diagnostics channel of a run: nothing here
//! ever changes control flow.

use serde::Serialize;

/// Counters accumulated over every archive of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    /// Archives fully processed
    pub archives_processed: usize,
    /// Archives skipped after a fetch or read failure
    pub archives_failed: usize,
    /// Text entries whose lines were read
    pub entries_processed: usize,
    /// Text entries skipped for an empty header or missing columns
    pub entries_skipped: usize,
    /// Data lines read from processed entries
    pub lines_read: u64,
    /// Lines rejected by the category filter
    pub lines_filtered_out: u64,
    /// Accepted lines whose amount is missing or not a number
    pub malformed_amounts: u64,
    /// Rows appended to the consolidated export
    pub rows_written: u64,
    /// Rows written with sentinels because no registry record was found
    pub unmatched_rows: u64,
    /// Rows contributed to the aggregation
    pub rows_aggregated: u64,
    /// Matched rows whose registry tax id failed the checksum
    pub invalid_tax_ids: u64,
    /// Messages of archive-level failures
    pub error_messages: Vec<String>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped archive
    pub fn add_archive_failure(&mut self, message: String) {
        self.archives_failed += 1;
        self.error_messages.push(message);
    }

    /// Lines that passed the category filter
    pub fn lines_accepted(&self) -> u64 {
        self.lines_read - self.lines_filtered_out
    }

    /// Percentage of written rows that found a registry record
    pub fn match_rate(&self) -> f64 {
        if self.rows_written == 0 {
            0.0
        } else {
            ((self.rows_written - self.unmatched_rows) as f64 / self.rows_written as f64) * 100.0
        }
    }

    /// Every accepted line is either written or counted as malformed
    pub fn is_complete(&self) -> bool {
        self.lines_accepted() == self.rows_written + self.malformed_amounts
    }

    /// Get a summary string of the stage statistics
    pub fn summary(&self) -> String {
        format!(
            "Archives: {} processed, {} failed | Entries: {} processed, {} skipped | \
             Lines: {} read, {} filtered out, {} malformed amounts | \
             Rows: {} written ({:.1}% matched), {} aggregated, {} invalid CNPJ",
            self.archives_processed,
            self.archives_failed,
            self.entries_processed,
            self.entries_skipped,
            self.lines_read,
            self.lines_filtered_out,
            self.malformed_amounts,
            self.rows_written,
            self.match_rate(),
            self.rows_aggregated,
            self.invalid_tax_ids
        )
    }
}

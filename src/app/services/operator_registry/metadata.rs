//! Operator registry metadata and statistics tracking
//!
//! This module defines the data structures for tracking registry loading
//! statistics. Invalid identifiers and skipped rows are reported here rather
//! than raised as errors.

use std::path::PathBuf;
use std::time::Instant;

/// Statistics about the registry loading process
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LoadStats {
    /// Data rows read (header excluded)
    pub rows_read: usize,

    /// Rows that produced a registry record
    pub records_indexed: usize,

    /// Rows too short to hold the tax id and registration number columns
    pub short_rows: usize,

    /// Rows whose tax id normalized to an empty string
    pub empty_tax_ids: usize,

    /// Rows whose tax id fails the checksum (kept)
    pub invalid_tax_ids: usize,

    /// Rows that replaced an earlier record with the same tax id
    pub duplicate_tax_ids: usize,

    /// Time taken to load the registry
    pub load_duration: std::time::Duration,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of rows that ended up indexed
    pub fn index_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.records_indexed as f64 / self.rows_read as f64) * 100.0
        }
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Read {} rows, indexed {} operators ({:.1}%), {} invalid CNPJ, {} empty CNPJ, \
             {} short rows, {} duplicates in {:.2}s",
            self.rows_read,
            self.records_indexed,
            self.index_rate(),
            self.invalid_tax_ids,
            self.empty_tax_ids,
            self.short_rows,
            self.duplicate_tax_ids,
            self.load_duration.as_secs_f64()
        )
    }
}

/// Metadata about a loaded registry
#[derive(Debug, Clone)]
pub struct RegistryMetadata {
    /// File the registry was loaded from
    pub source_path: PathBuf,

    /// Operators indexed by tax id
    pub operator_count: usize,

    /// Registration numbers in the bridge table
    pub bridge_count: usize,

    /// When the registry was loaded
    pub load_time: Instant,
}

impl RegistryMetadata {
    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Registry {}: {} operators, {} registration numbers",
            self.source_path.display(),
            self.operator_count,
            self.bridge_count
        )
    }
}

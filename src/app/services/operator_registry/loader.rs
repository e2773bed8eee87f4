//! Operator registry loading
//!
//! The registry is read once, before any filing is processed. A missing file
//! aborts the run; defects inside the file (short rows, empty or
//! checksum-invalid tax ids) are counted and logged but never fatal.

use super::OperatorRegistry;
use super::metadata::LoadStats;
use super::parser::{RegistryColumns, parse_registry_record};
use crate::app::services::delimited::{ColumnMapping, data_reader, read_header_line};
use crate::app::services::tax_id;
use crate::{Error, Result};
use csv::ByteRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

impl OperatorRegistry {
    /// Load the registry from a file
    ///
    /// # Errors
    /// * Returns `Error::MissingRegistryFile` if the file does not exist
    /// * Returns `Error::RegistryFormat` if the header is empty or lacks a
    ///   required column
    /// * Returns `Error::Io` / `Error::CsvParsing` for unreadable files
    pub fn load_from_file(path: &Path) -> Result<(Self, LoadStats)> {
        info!("Loading operator registry from {}", path.display());

        if !path.is_file() {
            return Err(Error::missing_registry_file(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| {
            Error::io(format!("Failed to open registry {}", path.display()), e)
        })?;

        let (mut registry, stats) =
            Self::load_from_reader(BufReader::new(file), &path.display().to_string())?;
        registry.source_path = path.to_path_buf();

        Ok((registry, stats))
    }

    /// Load the registry from any buffered reader
    ///
    /// `source_name` is only used in log and error messages.
    pub fn load_from_reader<R: BufRead>(mut reader: R, source_name: &str) -> Result<(Self, LoadStats)> {
        let start_time = Instant::now();
        let mut registry = Self::new(source_name.into());
        let mut stats = LoadStats::new();

        let header = read_header_line(&mut reader)?
            .ok_or_else(|| Error::registry_format(source_name, "Registry file is empty"))?;
        let mapping = ColumnMapping::from_header_line(&header)?;
        let columns = RegistryColumns::resolve(&mapping, source_name)?;

        debug!(
            "Registry columns resolved: {:?} (delimiter '{}')",
            columns, mapping.delimiter as char
        );

        let mut csv_reader = data_reader(reader, mapping.delimiter);
        let mut record = ByteRecord::new();

        loop {
            let has_record = csv_reader.read_byte_record(&mut record).map_err(|e| {
                Error::csv_parsing(source_name, "Failed to read registry row", Some(e))
            })?;
            if !has_record {
                break;
            }

            stats.rows_read += 1;
            // +1 for the header line consumed before the csv reader
            let line_number = record.position().map(|p| p.line() + 1).unwrap_or_default();

            let Some(entry) = parse_registry_record(&record, &columns) else {
                stats.short_rows += 1;
                debug!("Skipping short registry row at line {}", line_number);
                continue;
            };

            if entry.tax_id.is_empty() {
                stats.empty_tax_ids += 1;
                debug!("Skipping registry row without CNPJ at line {}", line_number);
                continue;
            }

            if !tax_id::is_valid(&entry.tax_id) {
                stats.invalid_tax_ids += 1;
                warn!(
                    "Invalid CNPJ {} for operator '{}' at line {} (kept)",
                    entry.tax_id, entry.legal_name, line_number
                );
            }

            if registry.insert(entry) {
                stats.duplicate_tax_ids += 1;
            }
            stats.records_indexed += 1;
        }

        registry.load_time = start_time;
        stats.load_duration = start_time.elapsed();

        info!(
            "Operator registry loaded: {} operators, {} registration numbers ({})",
            registry.operator_count(),
            registry.bridge_count(),
            stats.summary()
        );

        Ok((registry, stats))
    }
}

//! Streaming filter-join over quarterly filing archives
//!
//! Each line is handled exactly once and never retained: filter, parse the
//! amount, join, append to the consolidated export, contribute to the
//! aggregation. Registry indices are borrowed read-only for the whole run.

use super::filter::CategoryFilter;
use super::join::{JoinOutcome, join_line};
use super::stats::ProcessingStats;
use crate::app::models::{QuarterPeriod, RawFilingLine};
use crate::app::services::aggregation::ExpenseAggregator;
use crate::app::services::archive_source::entries::for_each_text_entry;
use crate::app::services::delimited::{
    ColumnMapping, data_reader, parse_amount, read_header_line, record_field,
};
use crate::app::services::operator_registry::OperatorRegistry;
use crate::app::services::report_writer::ConsolidatedWriter;
use crate::constants::filing_columns;
use crate::{Error, Result};
use csv::ByteRecord;
use std::io::{BufReader, Read, Seek, Write};
use tracing::{debug, info, warn};

/// Column positions of a filing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilingColumns {
    pub registration_number: usize,
    pub description: usize,
    pub amount: usize,
}

impl FilingColumns {
    /// Resolve the three join columns; `None` when any is missing
    pub fn resolve(mapping: &ColumnMapping) -> Option<Self> {
        Some(Self {
            registration_number: mapping.find(filing_columns::REGISTRATION_NUMBER)?,
            description: mapping.find(filing_columns::DESCRIPTION)?,
            amount: mapping.find(filing_columns::AMOUNT)?,
        })
    }
}

/// Extract the fields of a filing line
///
/// Fields beyond the end of a short record read as empty: a missing
/// registration number yields an unmatched row, a missing amount a
/// malformed one.
pub fn parse_filing_line(record: &ByteRecord, columns: &FilingColumns) -> RawFilingLine {
    let field = |index: usize| record_field(record, index).unwrap_or_default();

    RawFilingLine {
        registration_number_raw: field(columns.registration_number),
        description: field(columns.description),
        raw_amount: field(columns.amount),
    }
}

/// Filter-join stage for one run
///
/// Owns the consolidated writer, the accumulator and the run counters until
/// [`FilingProcessor::finish`] hands them back.
pub struct FilingProcessor<'r, W: Write> {
    registry: &'r OperatorRegistry,
    filter: CategoryFilter,
    default_year: String,
    writer: ConsolidatedWriter<W>,
    aggregator: ExpenseAggregator,
    stats: ProcessingStats,
}

/// Everything a finished stage hands to the report emitter
pub struct StageOutput<W> {
    pub aggregator: ExpenseAggregator,
    pub stats: ProcessingStats,
    pub output: W,
}

impl<'r, W: Write> FilingProcessor<'r, W> {
    pub fn new(
        registry: &'r OperatorRegistry,
        filter: CategoryFilter,
        default_year: impl Into<String>,
        writer: ConsolidatedWriter<W>,
    ) -> Self {
        Self {
            registry,
            filter,
            default_year: default_year.into(),
            writer,
            aggregator: ExpenseAggregator::new(),
            stats: ProcessingStats::new(),
        }
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ProcessingStats {
        &mut self.stats
    }

    pub fn aggregator(&self) -> &ExpenseAggregator {
        &self.aggregator
    }

    /// Process every text entry of one archive
    ///
    /// # Errors
    /// * `Error::Archive` when the archive or one of its entries cannot be
    ///   read; the caller may skip the archive and go on
    /// * Any other error comes from the consolidated writer and is fatal
    pub fn process_archive<R: Read + Seek>(&mut self, archive_name: &str, reader: R) -> Result<()> {
        let period = QuarterPeriod::from_archive_name(archive_name, &self.default_year);
        let rows_before = self.stats.rows_written;

        info!(
            "Processing archive {} (period {} {})",
            archive_name, period.code, period.year
        );

        let entries = for_each_text_entry(reader, archive_name, |entry_name, entry| {
            self.process_entry(archive_name, entry_name, &period, entry)
        })?;

        self.writer.flush()?;
        self.stats.archives_processed += 1;

        info!(
            "Archive {} done: {} text entries, {} rows written",
            archive_name,
            entries,
            self.stats.rows_written - rows_before
        );
        Ok(())
    }

    /// Process the lines of one text entry
    pub fn process_entry(
        &mut self,
        archive_name: &str,
        entry_name: &str,
        period: &QuarterPeriod,
        entry: &mut dyn Read,
    ) -> Result<()> {
        let read_error = |message: String| {
            Error::archive(
                archive_name,
                format!("Failed to read entry '{}': {}", entry_name, message),
                None,
            )
        };

        let mut reader = BufReader::new(entry);
        let Some(header) = read_header_line(&mut reader).map_err(|e| read_error(e.to_string()))? else {
            warn!("Skipping empty entry '{}' in {}", entry_name, archive_name);
            self.stats.entries_skipped += 1;
            return Ok(());
        };

        let mapping = ColumnMapping::from_header_line(&header).map_err(|e| read_error(e.to_string()))?;
        let Some(columns) = FilingColumns::resolve(&mapping) else {
            warn!(
                "Skipping entry '{}' in {}: missing one of {:?}, {:?}, {:?}",
                entry_name,
                archive_name,
                filing_columns::REGISTRATION_NUMBER,
                filing_columns::DESCRIPTION,
                filing_columns::AMOUNT
            );
            self.stats.entries_skipped += 1;
            return Ok(());
        };

        debug!("Filing columns for '{}': {:?}", entry_name, columns);

        let mut csv_reader = data_reader(reader, mapping.delimiter);
        let mut record = ByteRecord::new();

        loop {
            let has_record = csv_reader
                .read_byte_record(&mut record)
                .map_err(|e| read_error(e.to_string()))?;
            if !has_record {
                break;
            }

            self.stats.lines_read += 1;
            self.process_record(&record, &columns, period)?;
        }

        self.stats.entries_processed += 1;
        Ok(())
    }

    fn process_record(
        &mut self,
        record: &ByteRecord,
        columns: &FilingColumns,
        period: &QuarterPeriod,
    ) -> Result<()> {
        if !self.filter.matches_record(record, columns.description) {
            self.stats.lines_filtered_out += 1;
            return Ok(());
        }

        // +1 for the header line consumed before the csv reader
        let line_number = record.position().map(|p| p.line() + 1).unwrap_or_default();

        let line = parse_filing_line(record, columns);

        let Some(amount) = parse_amount(&line.raw_amount) else {
            self.stats.malformed_amounts += 1;
            debug!(
                "Skipping filing line {}: malformed amount '{}'",
                line_number, line.raw_amount
            );
            return Ok(());
        };

        let (row, outcome) = join_line(self.registry, &line, amount, period);
        match outcome {
            JoinOutcome::Matched => {}
            JoinOutcome::MatchedInvalidTaxId => self.stats.invalid_tax_ids += 1,
            JoinOutcome::Unmatched => {
                self.stats.unmatched_rows += 1;
                debug!(
                    "No registry match for registration number '{}' at line {}",
                    line.registration_number_raw, line_number
                );
            }
        }

        self.writer.write_row(&row)?;
        self.stats.rows_written += 1;

        if let Some(key) = row.group_key() {
            self.aggregator.contribute(key, row.amount, &row.period);
            self.stats.rows_aggregated += 1;
        }

        Ok(())
    }

    /// Flush the consolidated export and hand back the stage state
    pub fn finish(self) -> Result<StageOutput<W>> {
        let output = self.writer.finish()?;
        Ok(StageOutput {
            aggregator: self.aggregator,
            stats: self.stats,
            output,
        })
    }
}

//! Aggregated export: one row per group, descending by total

use crate::app::services::aggregation::{ExpenseAggregator, GroupStatistics};
use crate::constants::{AGGREGATED_HEADER, CANONICAL_DELIMITER};
use crate::{Error, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Fields of one aggregated row, numerics with two decimals and `.` point
pub fn summary_record(group: &GroupStatistics) -> [String; 5] {
    [
        group.key().legal_name.clone(),
        group.key().region.clone(),
        format!("{:.2}", group.total_amount()),
        format!("{:.2}", group.quarterly_average()),
        format!("{:.2}", group.standard_deviation()),
    ]
}

/// Write already sorted groups to `output`; returns the row count
pub fn write_summary<W: Write>(groups: &[GroupStatistics], output: W, target: &str) -> Result<usize> {
    let csv_error =
        |e: csv::Error| Error::csv_parsing(target, "Failed to write aggregated export", Some(e));

    let mut writer = WriterBuilder::new()
        .delimiter(CANONICAL_DELIMITER)
        .from_writer(output);

    writer.write_record(AGGREGATED_HEADER).map_err(csv_error)?;
    for group in groups {
        writer.write_record(summary_record(group)).map_err(csv_error)?;
    }

    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", target), e))?;

    Ok(groups.len())
}

/// Drain the accumulator into the aggregated export file
pub fn write_summary_file(aggregator: ExpenseAggregator, path: &Path) -> Result<usize> {
    let target = path.display().to_string();
    let groups = aggregator.into_sorted();

    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create aggregated export {}", target), e))?;
    let rows = write_summary(&groups, file, &target)?;

    info!("Aggregated export written: {} groups to {}", rows, target);
    Ok(rows)
}

//! In-place registry sanitation
//!
//! Registry exports are sometimes tab- or comma-separated and carry CNPJs in
//! mixed formats. This pass rewrites the file so the loader sees `;`
//! separators and 14-digit tax ids. It must finish and persist before the
//! loader opens the file, since both work on the same path.
//!
//! The rewritten content goes to a temporary file in the same directory which
//! then replaces the source, so a failed pass leaves the original untouched.

use crate::app::services::delimited::{ColumnMapping, clean_field};
use crate::app::services::tax_id;
use crate::constants::{CANONICAL_DELIMITER, registry_columns};
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Statistics about a sanitation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SanitizeStats {
    /// Lines whose separators were rewritten to `;`
    pub lines_resplit: usize,

    /// Data rows written back
    pub rows_written: usize,

    /// Tax ids whose text changed after normalization
    pub tax_ids_normalized: usize,

    /// Tax ids failing the checksum (kept, logged with their line number)
    pub invalid_tax_ids: usize,
}

/// Rewrite one line to use the canonical `;` separator
///
/// Lines that already contain `;` are left alone. Otherwise tabs, or failing
/// that commas, become `;`. Returns the line and whether it changed.
pub fn normalize_separators(line: &str) -> (String, bool) {
    let canonical = CANONICAL_DELIMITER as char;

    if line.contains(canonical) {
        (line.to_string(), false)
    } else if line.contains('\t') {
        (line.replace('\t', ";"), true)
    } else if line.contains(',') {
        (line.replace(',', ";"), true)
    } else {
        (line.to_string(), false)
    }
}

/// Sanitize the registry file at `path` in place
///
/// # Errors
/// * Returns `Error::MissingRegistryFile` if the file does not exist
/// * Returns `Error::RegistryFormat` if the header has no tax id column
/// * Returns `Error::Io` / `Error::CsvParsing` if reading or persisting fails
pub fn sanitize_registry_file(path: &Path) -> Result<SanitizeStats> {
    info!("Sanitizing registry file {}", path.display());

    if !path.is_file() {
        return Err(Error::missing_registry_file(path.display().to_string()));
    }

    let source_name = path.display().to_string();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::io(format!("Failed to read registry {}", source_name), e))?;
    let content = String::from_utf8_lossy(&bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&*content);

    let mut stats = SanitizeStats::default();
    let mut normalized = String::with_capacity(content.len());
    for line in content.lines() {
        let (line, changed) = normalize_separators(line);
        if changed {
            stats.lines_resplit += 1;
        }
        normalized.push_str(&line);
        normalized.push('\n');
    }

    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(directory).map_err(|e| {
        Error::io(format!("Failed to create temporary file in {}", directory.display()), e)
    })?;

    sanitize_content(&normalized, &source_name, temp.as_file_mut(), &mut stats)?;

    temp.persist(path)
        .map_err(|e| Error::io(format!("Failed to replace registry {}", source_name), e.error))?;

    info!(
        "Registry sanitized: {} rows, {} lines re-split, {} CNPJ normalized, {} invalid CNPJ kept",
        stats.rows_written, stats.lines_resplit, stats.tax_ids_normalized, stats.invalid_tax_ids
    );

    Ok(stats)
}

/// Normalize the tax id column of `;`-separated content into `output`
fn sanitize_content<W: Write>(
    content: &str,
    source_name: &str,
    output: W,
    stats: &mut SanitizeStats,
) -> Result<()> {
    let mut reader = ReaderBuilder::new()
        .delimiter(CANONICAL_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut writer = WriterBuilder::new()
        .delimiter(CANONICAL_DELIMITER)
        .flexible(true)
        .from_writer(output);

    let csv_error = |e: csv::Error| Error::csv_parsing(source_name, "Failed to rewrite registry", Some(e));

    let mut record = StringRecord::new();
    if !reader.read_record(&mut record).map_err(csv_error)? {
        return Err(Error::registry_format(source_name, "Registry file is empty"));
    }

    let header: Vec<String> = record.iter().map(clean_field).collect();
    let mapping = ColumnMapping::from_names(&header, CANONICAL_DELIMITER);
    let tax_id_column = mapping.find(registry_columns::TAX_ID).ok_or_else(|| {
        Error::registry_format(source_name, "Missing required column 'CNPJ'")
    })?;
    writer.write_record(&header).map_err(csv_error)?;

    while reader.read_record(&mut record).map_err(csv_error)? {
        let line_number = record.position().map(|p| p.line()).unwrap_or_default();

        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if let Some(raw) = fields.get_mut(tax_id_column) {
            let cleaned = clean_field(raw);
            let normalized = tax_id::normalize(&cleaned);

            if normalized != cleaned {
                stats.tax_ids_normalized += 1;
            }
            if !normalized.is_empty() && !tax_id::is_valid(&normalized) {
                stats.invalid_tax_ids += 1;
                warn!("Invalid CNPJ '{}' at registry line {} (kept)", cleaned, line_number);
            }

            *raw = normalized;
        }

        writer.write_record(&fields).map_err(csv_error)?;
        stats.rows_written += 1;
    }

    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush sanitized registry {}", source_name), e))?;

    Ok(())
}

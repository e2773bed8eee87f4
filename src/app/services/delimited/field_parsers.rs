//! Field parsing utilities for ANS delimited tables
//!
//! This module provides helpers for reading header lines, extracting cleaned
//! field values from CSV records, and parsing monetary amounts written with
//! either `.` or the Brazilian `,` decimal convention.

use crate::constants::{CANONICAL_DELIMITER, FALLBACK_DELIMITER};
use crate::{Error, Result};
use csv::ByteRecord;
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

/// Plain decimal with an optional `.` fraction, e.g. `-1234.56`
static DOT_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid dot-decimal pattern"));

/// Brazilian form with `.` thousands groups and a `,` fraction, e.g. `1.234,56`
static LOCALE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)*(,\d+)?$").expect("valid locale-decimal pattern"));

/// Pick the header delimiter: `;` when present, `,` otherwise
pub fn detect_delimiter(header: &str) -> u8 {
    if header.as_bytes().contains(&CANONICAL_DELIMITER) {
        CANONICAL_DELIMITER
    } else {
        FALLBACK_DELIMITER
    }
}

/// Trim a raw field and drop every double quote
pub fn clean_field(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

/// Get a cleaned field from a record; `None` when the record is too short
pub fn record_field(record: &ByteRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(|bytes| clean_field(&String::from_utf8_lossy(bytes)))
}

/// Read the first line of a table
///
/// Returns `None` for empty input. A UTF-8 byte order mark and the line
/// terminator are removed; invalid UTF-8 is replaced rather than rejected.
pub fn read_header_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buffer = Vec::new();
    let read = reader
        .read_until(b'\n', &mut buffer)
        .map_err(|e| Error::io("Failed to read header line", e))?;

    if read == 0 {
        return Ok(None);
    }

    let line = String::from_utf8_lossy(&buffer);
    let line = line.strip_prefix('\u{feff}').unwrap_or(&*line);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Parse a monetary amount
///
/// A value that already reads as a plain `.`-decimal is parsed as is.
/// Otherwise `.` is treated as a thousands separator and `,` as the decimal
/// separator. Anything else is not a number and yields `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = clean_field(raw);

    if DOT_DECIMAL.is_match(&value) {
        return value.parse().ok();
    }

    if LOCALE_DECIMAL.is_match(&value) {
        return value.replace('.', "").replace(',', ".").parse().ok();
    }

    None
}

//! Delimited-text helpers shared by the registry loader and the filing stage
//!
//! ## Architecture
//!
//! - [`column_mapping`] - Case-insensitive header resolution
//! - [`field_parsers`] - Header reading, field cleaning and amount parsing
//!
//! Tokenization itself is delegated to the `csv` crate with quoting turned
//! off: a record never spans more than one line, and quotes are stripped
//! from each field by [`clean_field`]. Records are read as
//! [`csv::ByteRecord`] so a stray non-UTF-8 byte in one field never costs the
//! whole line.

pub mod column_mapping;
pub mod field_parsers;

pub use column_mapping::ColumnMapping;
pub use field_parsers::{clean_field, detect_delimiter, parse_amount, read_header_line, record_field};

use std::io::Read;

/// Build a reader over the data rows that follow an already consumed header
///
/// An unbalanced quote stays inside its own line.
pub fn data_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader)
}

//! Header analysis for `;`-delimited ANS tables
//!
//! Column order is not guaranteed across registry versions or filing
//! quarters, so every column is resolved by name. Names are compared
//! case-insensitively after trimming and quote stripping.

use super::field_parsers::{clean_field, detect_delimiter};
use crate::{Error, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;

/// Column mapping resolved from a header line
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Upper-cased column name to index mapping (first occurrence wins)
    pub name_to_index: HashMap<String, usize>,

    /// Delimiter detected from the header line
    pub delimiter: u8,

    /// Number of columns in the header
    pub column_count: usize,
}

impl ColumnMapping {
    /// Analyze a raw header line
    ///
    /// The delimiter is `;` when the line contains one and `,` otherwise.
    pub fn from_header_line(line: &str) -> Result<Self> {
        let delimiter = detect_delimiter(line);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(line.as_bytes());

        let mut record = csv::StringRecord::new();
        let has_record = reader
            .read_record(&mut record)
            .map_err(|e| Error::csv_parsing("header", "Failed to tokenize header line", Some(e)))?;

        let names: Vec<String> = if has_record {
            record.iter().map(clean_field).collect()
        } else {
            Vec::new()
        };

        Ok(Self::from_names(&names, delimiter))
    }

    /// Build a mapping from already tokenized column names
    pub fn from_names<S: AsRef<str>>(names: &[S], delimiter: u8) -> Self {
        let mut name_to_index = HashMap::new();

        for (index, name) in names.iter().enumerate() {
            name_to_index
                .entry(clean_field(name.as_ref()).to_uppercase())
                .or_insert(index);
        }

        Self {
            name_to_index,
            delimiter,
            column_count: names.len(),
        }
    }

    /// Index of the first column matching any of the accepted names
    pub fn find(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.name_to_index.get(&name.to_uppercase()).copied())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_header_case_insensitive() {
        let mapping =
            ColumnMapping::from_header_line("\"DATA\";\"reg_ans\";\"CD_CONTA_CONTABIL\";\"Descricao\"")
                .unwrap();

        assert_eq!(mapping.delimiter, b';');
        assert_eq!(mapping.column_count, 4);
        assert_eq!(mapping.find(&["REG_ANS"]), Some(1));
        assert_eq!(mapping.find(&["DESCRICAO"]), Some(3));
        assert_eq!(mapping.find(&["VL_SALDO_FINAL"]), None);
    }

    #[test]
    fn test_comma_header_fallback() {
        let mapping = ColumnMapping::from_header_line("CNPJ, Razao_Social ,UF").unwrap();

        assert_eq!(mapping.delimiter, b',');
        assert_eq!(mapping.find(&["RAZAO_SOCIAL"]), Some(1));
        assert_eq!(mapping.find(&["uf"]), Some(2));
    }

    #[test]
    fn test_aliases_and_first_occurrence() {
        let mapping = ColumnMapping::from_names(&["REGISTRO_ANS", "UF", "uf"], b';');

        assert_eq!(
            mapping.find(&["REGISTRO_OPERADORA", "REGISTRO_ANS"]),
            Some(0)
        );
        assert_eq!(mapping.find(&["UF"]), Some(1));
        assert_eq!(mapping.find(&["CNPJ"]), None);
    }

    #[test]
    fn test_empty_header() {
        let mapping = ColumnMapping::from_header_line("").unwrap();
        assert_eq!(mapping.column_count, 0);
        assert_eq!(mapping.find(&["CNPJ"]), None);
    }
}

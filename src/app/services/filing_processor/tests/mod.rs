//! Shared test utilities and fixtures for filter-join tests

use crate::app::models::RegistryRecord;
use crate::app::services::filing_processor::{CategoryFilter, FilingProcessor, StageOutput};
use crate::app::services::operator_registry::OperatorRegistry;
use crate::app::services::report_writer::ConsolidatedWriter;
use crate::constants::DEFAULT_FILTER_TEXT;
use std::io::{Cursor, Write};
use zip::write::FileOptions;

pub mod join_tests;

pub const ACME_CNPJ: &str = "11222333000181";
pub const BETA_CNPJ: &str = "11444777000161";
pub const INVALID_CNPJ: &str = "12345678000100";

/// Header of a quarterly filing table
pub const FILING_HEADER: &str =
    "\"DATA\";\"REG_ANS\";\"CD_CONTA_CONTABIL\";\"DESCRICAO\";\"VL_SALDO_INICIAL\";\"VL_SALDO_FINAL\"";

/// Registry with two valid operators, one invalid CNPJ and one without name
pub fn create_test_registry() -> OperatorRegistry {
    OperatorRegistry::from_records(vec![
        RegistryRecord::new(ACME_CNPJ, "ACME SAUDE", "000555", "Medicina de Grupo", "SP"),
        RegistryRecord::new(BETA_CNPJ, "BETA ODONTO", "000777", "Odontologia de Grupo", "RJ"),
        RegistryRecord::new(INVALID_CNPJ, "GAMA SAUDE", "000999", "Cooperativa Medica", "MG"),
        RegistryRecord::new("00000000000191", "", "000111", "Autogestao", "DF"),
    ])
}

/// Build a filing line with the standard column layout
pub fn filing_line(registration: &str, description: &str, amount: &str) -> String {
    format!(
        "\"2025-03-31\";\"{}\";\"41111\";\"{}\";\"0,00\";\"{}\"",
        registration, description, amount
    )
}

/// Build a standard expense line
pub fn expense_line(registration: &str, amount: &str) -> String {
    filing_line(registration, DEFAULT_FILTER_TEXT, amount)
}

/// Build a table body from a header and lines
pub fn table(header: &str, lines: &[String]) -> String {
    let mut content = header.to_string();
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content.push('\n');
    content
}

/// Build an in-memory ZIP archive; names ending with `/` become directories
pub fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, FileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Run the stage over in-memory archives and return its output as text
pub fn run_stage(
    registry: &OperatorRegistry,
    archives: &[(&str, Vec<u8>)],
) -> (String, StageOutput<Vec<u8>>) {
    let writer = ConsolidatedWriter::new(Vec::new(), "memory").unwrap();
    let mut processor =
        FilingProcessor::new(registry, CategoryFilter::new(DEFAULT_FILTER_TEXT), "2025", writer);

    for (name, bytes) in archives {
        processor
            .process_archive(name, Cursor::new(bytes.clone()))
            .unwrap();
    }

    let output = processor.finish().unwrap();
    let text = String::from_utf8(output.output.clone()).unwrap();
    (text, output)
}

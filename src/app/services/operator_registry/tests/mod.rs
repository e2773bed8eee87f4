//! Shared test utilities and fixtures for operator registry tests

use crate::app::models::RegistryRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub mod loader_tests;

/// Valid CNPJs used across the fixtures
pub const ACME_CNPJ: &str = "11222333000181";
pub const BETA_CNPJ: &str = "11444777000161";

/// Header of a typical CADOP export
pub const CADOP_HEADER: &str =
    "Registro_ANS;CNPJ;Razao_Social;Nome_Fantasia;Modalidade;Logradouro;UF";

/// Create a registry record with standard values
pub fn create_test_record(tax_id: &str, name: &str, registration: &str, region: &str) -> RegistryRecord {
    RegistryRecord::new(tax_id, name, registration, "Medicina de Grupo", region)
}

/// Write a registry file made of the given lines
pub fn create_registry_file(dir: &Path, filename: &str, lines: &[&str]) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    Ok(path)
}

/// Standard CADOP file with two valid operators and one invalid CNPJ
pub fn create_standard_registry(dir: &Path) -> std::io::Result<PathBuf> {
    create_registry_file(
        dir,
        "Relatorio_cadop.csv",
        &[
            CADOP_HEADER,
            "\"000555\";\"11.222.333/0001-81\";\"ACME SAUDE\";\"ACME\";\"Medicina de Grupo\";\"RUA A\";\"SP\"",
            "000777;11444777000161;BETA ODONTO;BETA;Odontologia de Grupo;RUA B;RJ",
            "000999;12345678000100;GAMA SAUDE;GAMA;Cooperativa Medica;RUA C;MG",
        ],
    )
}

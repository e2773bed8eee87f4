//! Tests for operator registry loading

use super::*;
use crate::Error;
use crate::app::services::operator_registry::OperatorRegistry;
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_load_standard_registry() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_standard_registry(temp_dir.path()).unwrap();

    let (registry, stats) = OperatorRegistry::load_from_file(&path).unwrap();

    assert_eq!(registry.operator_count(), 3);
    assert_eq!(registry.bridge_count(), 3);
    assert_eq!(stats.rows_read, 3);
    assert_eq!(stats.records_indexed, 3);
    assert_eq!(stats.invalid_tax_ids, 1);
    assert_eq!(stats.short_rows, 0);

    let acme = registry.lookup_record(ACME_CNPJ).unwrap();
    assert_eq!(acme.legal_name, "ACME SAUDE");
    assert_eq!(acme.registration_number, "000555");
    assert_eq!(acme.operator_type, "Medicina de Grupo");
    assert_eq!(acme.region, "SP");

    assert_eq!(registry.metadata().source_path, path);
}

#[test]
fn test_invalid_cnpj_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_standard_registry(temp_dir.path()).unwrap();

    let (registry, _) = OperatorRegistry::load_from_file(&path).unwrap();

    let gama = registry.lookup_by_registration("000999").unwrap();
    assert_eq!(gama.tax_id, "12345678000100");
    assert_eq!(gama.legal_name, "GAMA SAUDE");
}

#[test]
fn test_missing_registry_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.csv");

    let result = OperatorRegistry::load_from_file(&path);
    assert!(matches!(result, Err(Error::MissingRegistryFile { .. })));
}

#[test]
fn test_missing_required_column() {
    let input = Cursor::new("CNPJ;Razao_Social;UF\n11222333000181;ACME;SP\n");

    let result = OperatorRegistry::load_from_reader(input, "no-registration.csv");
    assert!(matches!(result, Err(Error::RegistryFormat { .. })));
}

#[test]
fn test_empty_registry_is_format_error() {
    let result = OperatorRegistry::load_from_reader(Cursor::new(""), "empty.csv");
    assert!(matches!(result, Err(Error::RegistryFormat { .. })));
}

#[test]
fn test_optional_columns_default() {
    let input = Cursor::new("REGISTRO_OPERADORA;CNPJ;RAZAO_SOCIAL\n000555;11222333000181;ACME SAUDE\n");

    let (registry, _) = OperatorRegistry::load_from_reader(input, "minimal.csv").unwrap();

    let acme = registry.lookup_record(ACME_CNPJ).unwrap();
    assert_eq!(acme.operator_type, "N/A");
    assert_eq!(acme.region, "BR");
}

#[test]
fn test_short_and_empty_rows_skipped() {
    let input = Cursor::new(
        "RAZAO_SOCIAL;REGISTRO_OPERADORA;CNPJ\n\
         ACME SAUDE;000555;11222333000181\n\
         SHORT ROW;000111\n\
         NO CNPJ;000222;  \n\
         LETTERS;000333;abc\n",
    );

    let (registry, stats) = OperatorRegistry::load_from_reader(input, "defects.csv").unwrap();

    assert_eq!(stats.rows_read, 4);
    assert_eq!(stats.short_rows, 1);
    assert_eq!(stats.empty_tax_ids, 2);
    assert_eq!(stats.records_indexed, 1);
    assert_eq!(registry.operator_count(), 1);
    assert!(registry.resolve_tax_id("000222").is_none());
}

#[test]
fn test_short_cnpj_is_padded() {
    let input = Cursor::new("CNPJ;RAZAO_SOCIAL;REGISTRO_OPERADORA\n191;BANCO;000001\n");

    let (registry, stats) = OperatorRegistry::load_from_reader(input, "padded.csv").unwrap();

    assert_eq!(registry.resolve_tax_id("000001"), Some("00000000000191"));
    assert_eq!(stats.invalid_tax_ids, 0);
}

#[test]
fn test_duplicate_tax_id_last_wins() {
    let input = Cursor::new(
        "CNPJ;RAZAO_SOCIAL;REGISTRO_OPERADORA;UF\n\
         11222333000181;ACME OLD;000555;SP\n\
         11222333000181;ACME NEW;000556;RJ\n",
    );

    let (registry, stats) = OperatorRegistry::load_from_reader(input, "dup.csv").unwrap();

    assert_eq!(stats.duplicate_tax_ids, 1);
    assert_eq!(registry.operator_count(), 1);
    assert_eq!(registry.lookup_record(ACME_CNPJ).unwrap().legal_name, "ACME NEW");
    // both registration numbers still bridge to the surviving record
    assert_eq!(registry.lookup_by_registration("000555").unwrap().region, "RJ");
    assert_eq!(registry.lookup_by_registration("000556").unwrap().region, "RJ");
}

#[test]
fn test_comma_separated_registry() {
    let input = Cursor::new("CNPJ,RAZAO_SOCIAL,REGISTRO_OPERADORA,UF\n11444777000161,BETA,000777,RJ\n");

    let (registry, _) = OperatorRegistry::load_from_reader(input, "comma.csv").unwrap();

    assert_eq!(registry.lookup_by_registration("000777").unwrap().legal_name, "BETA");
    assert!(registry.lookup_record(BETA_CNPJ).is_some());
}

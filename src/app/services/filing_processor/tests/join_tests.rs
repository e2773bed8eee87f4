//! Tests for the two-hop join and row composition

use super::*;
use crate::app::models::{QuarterPeriod, RawFilingLine};
use crate::app::services::filing_processor::{JoinOutcome, join_line};
use crate::constants::{NO_MATCH_NAME, UNKNOWN};

fn line(registration: &str) -> RawFilingLine {
    RawFilingLine {
        registration_number_raw: registration.to_string(),
        description: "Despesas com Eventos / Sinistros".to_string(),
        raw_amount: "1.234,56".to_string(),
    }
}

fn period() -> QuarterPeriod {
    QuarterPeriod::from_archive_name("1T2025.zip", "2025")
}

#[test]
fn test_matched_row_uses_registry_fields() {
    let registry = create_test_registry();
    let (row, outcome) = join_line(&registry, &line("000555"), 1234.56, &period());

    assert_eq!(outcome, JoinOutcome::Matched);
    assert_eq!(row.tax_id, "11.222.333/0001-81");
    assert_eq!(row.legal_name, "ACME SAUDE");
    assert_eq!(row.operator_type, "Medicina de Grupo");
    assert_eq!(row.region, "SP");
    assert_eq!(row.registration_number, "000555");
    assert_eq!(row.period, "1T");
    assert_eq!(row.year, "2025");
    assert_eq!(row.amount, 1234.56);
}

#[test]
fn test_invalid_tax_id_written_empty() {
    let registry = create_test_registry();
    let (row, outcome) = join_line(&registry, &line("000999"), 10.0, &period());

    assert_eq!(outcome, JoinOutcome::MatchedInvalidTaxId);
    assert_eq!(row.tax_id, "");
    assert_eq!(row.legal_name, "GAMA SAUDE");
    assert_eq!(row.region, "MG");
    assert!(row.group_key().is_some());
}

#[test]
fn test_unmatched_row_keeps_raw_registration() {
    let registry = create_test_registry();
    let (row, outcome) = join_line(&registry, &line("555"), 5.0, &period());

    assert_eq!(outcome, JoinOutcome::Unmatched);
    assert_eq!(row.tax_id, "");
    assert_eq!(row.legal_name, NO_MATCH_NAME);
    assert_eq!(row.operator_type, UNKNOWN);
    assert_eq!(row.region, UNKNOWN);
    assert_eq!(row.registration_number, "555");
    assert_eq!(row.amount, 5.0);
    assert!(row.group_key().is_none());
}

#[test]
fn test_empty_legal_name_becomes_sentinel() {
    let registry = create_test_registry();
    let (row, outcome) = join_line(&registry, &line("000111"), 1.0, &period());

    assert_eq!(outcome, JoinOutcome::Matched);
    assert_eq!(row.tax_id, "00.000.000/0001-91");
    assert_eq!(row.legal_name, NO_MATCH_NAME);
    assert_eq!(row.region, "DF");
    assert!(row.group_key().is_none());
}

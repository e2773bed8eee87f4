//! Two-hop join of a filing line against the operator registry
//!
//! The registration number printed in the filing is first translated into a
//! tax id through the bridge table, and the tax id is then used to fetch the
//! registry record. Both hops are plain lookups on the read-only indices.

use crate::app::models::{JoinedExpenseRow, QuarterPeriod, RawFilingLine};
use crate::app::services::operator_registry::OperatorRegistry;
use crate::app::services::tax_id;
use crate::constants::NO_MATCH_NAME;

/// How a filing line was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Both hops succeeded and the tax id passed the checksum
    Matched,

    /// Both hops succeeded but the tax id failed the checksum; the row is
    /// written with an empty tax id
    MatchedInvalidTaxId,

    /// Either hop failed; the row carries sentinels
    Unmatched,
}

/// Compose the consolidated row for one accepted filing line
pub fn join_line(
    registry: &OperatorRegistry,
    line: &RawFilingLine,
    amount: f64,
    period: &QuarterPeriod,
) -> (JoinedExpenseRow, JoinOutcome) {
    let record = registry
        .resolve_tax_id(&line.registration_number_raw)
        .and_then(|tax_id| registry.lookup_record(tax_id));

    let Some(record) = record else {
        return (
            JoinedExpenseRow::unmatched(&line.registration_number_raw, amount, period),
            JoinOutcome::Unmatched,
        );
    };

    let (formatted_tax_id, outcome) = if tax_id::is_valid(&record.tax_id) {
        (tax_id::format(&record.tax_id), JoinOutcome::Matched)
    } else {
        (String::new(), JoinOutcome::MatchedInvalidTaxId)
    };

    let legal_name = if record.legal_name.is_empty() {
        NO_MATCH_NAME.to_string()
    } else {
        record.legal_name.clone()
    };

    let row = JoinedExpenseRow {
        tax_id: formatted_tax_id,
        legal_name,
        period: period.code.clone(),
        year: period.year.clone(),
        amount,
        registration_number: record.registration_number.clone(),
        operator_type: record.operator_type.clone(),
        region: record.region.clone(),
    };

    (row, outcome)
}

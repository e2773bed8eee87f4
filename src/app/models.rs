//! Data models for ANS expense processing
//!
//! This module contains the core data structures for the operator registry,
//! the transient filing lines read from quarterly archives, and the rows and
//! keys produced by the join.

use crate::constants::{NO_MATCH_NAME, PERIOD_CODE_LEN, UNKNOWN, YEAR_LEN};
use serde::{Deserialize, Serialize};

// =============================================================================
// Registry Record
// =============================================================================

/// One operator from the registry (CADOP)
///
/// Built once while the registry is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Normalized 14-digit CNPJ (primary key of the registry index)
    pub tax_id: String,

    /// Legal name (razao social); may be empty in the source
    pub legal_name: String,

    /// ANS registration number exactly as printed in the registry
    pub registration_number: String,

    /// Operator type (modalidade), `N/A` when the registry has no such column
    pub operator_type: String,

    /// State code (UF), `BR` when the registry has no such column
    pub region: String,
}

impl RegistryRecord {
    /// Create a new registry record
    pub fn new(
        tax_id: impl Into<String>,
        legal_name: impl Into<String>,
        registration_number: impl Into<String>,
        operator_type: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            tax_id: tax_id.into(),
            legal_name: legal_name.into(),
            registration_number: registration_number.into(),
            operator_type: operator_type.into(),
            region: region.into(),
        }
    }
}

// =============================================================================
// Filing Line
// =============================================================================

/// The three fields of a filing line the pipeline cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFilingLine {
    /// Registration number (REG_ANS) as printed in the filing
    pub registration_number_raw: String,

    /// Free-text account description (DESCRICAO)
    pub description: String,

    /// Final balance (VL_SALDO_FINAL) before decimal parsing
    pub raw_amount: String,
}

// =============================================================================
// Quarter Period
// =============================================================================

/// Quarter code and year encoded in an archive name such as `1T2025.zip`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuarterPeriod {
    /// Two-character quarter code, e.g. `1T`
    pub code: String,

    /// Four-character year, e.g. `2025`
    pub year: String,
}

impl QuarterPeriod {
    /// Derive the period from an archive name
    ///
    /// Any directory part and a trailing `.zip` are ignored. The code is the
    /// first two characters of what remains and the year the next four; when
    /// the name is too short to hold a year, `default_year` is used.
    pub fn from_archive_name(name: &str, default_year: &str) -> Self {
        let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let base = strip_suffix_ignore_case(file_name, crate::constants::ARCHIVE_EXTENSION);
        let chars: Vec<char> = base.chars().collect();

        let code: String = chars.iter().take(PERIOD_CODE_LEN).collect();
        let year = if chars.len() >= PERIOD_CODE_LEN + YEAR_LEN {
            chars[PERIOD_CODE_LEN..PERIOD_CODE_LEN + YEAR_LEN]
                .iter()
                .collect()
        } else {
            default_year.to_string()
        };

        Self { code, year }
    }
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> &'a str {
    if name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

// =============================================================================
// Joined Expense Row
// =============================================================================

/// One row of the consolidated export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedExpenseRow {
    /// Formatted CNPJ, empty when unmatched or checksum-invalid
    pub tax_id: String,

    /// Legal name, or `null` when unresolved
    pub legal_name: String,

    /// Quarter code, e.g. `1T`
    pub period: String,

    /// Year, e.g. `2025`
    pub year: String,

    /// Expense amount
    pub amount: f64,

    /// Registry registration number when matched, raw filing value otherwise
    pub registration_number: String,

    /// Operator type, or `DESCONHECIDO` when unmatched
    pub operator_type: String,

    /// State code, or `DESCONHECIDO` when unmatched
    pub region: String,
}

impl JoinedExpenseRow {
    /// Build the row kept for a filing line with no registry match
    ///
    /// The financial value is preserved and every registry field carries a
    /// sentinel so the line still counts towards the consolidated totals.
    pub fn unmatched(registration_number_raw: &str, amount: f64, period: &QuarterPeriod) -> Self {
        Self {
            tax_id: String::new(),
            legal_name: NO_MATCH_NAME.to_string(),
            period: period.code.clone(),
            year: period.year.clone(),
            amount,
            registration_number: registration_number_raw.to_string(),
            operator_type: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
        }
    }

    /// Aggregation key, present only when both name and region are known
    pub fn group_key(&self) -> Option<GroupKey> {
        if self.legal_name == NO_MATCH_NAME || self.region == UNKNOWN {
            return None;
        }

        Some(GroupKey::new(&self.legal_name, &self.region))
    }

    /// Fields in consolidated export column order, amount with two decimals
    pub fn to_record(&self) -> [String; 8] {
        [
            self.tax_id.clone(),
            self.legal_name.clone(),
            self.period.clone(),
            self.year.clone(),
            format!("{:.2}", self.amount),
            self.registration_number.clone(),
            self.operator_type.clone(),
            self.region.clone(),
        ]
    }
}

// =============================================================================
// Group Key
// =============================================================================

/// Aggregation key: operator legal name and state
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub legal_name: String,
    pub region: String,
}

impl GroupKey {
    pub fn new(legal_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            region: region.into(),
        }
    }
}

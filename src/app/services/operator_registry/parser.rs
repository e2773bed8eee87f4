//! Registry record parsing from CSV data
//!
//! This module resolves the registry header into column positions and turns
//! each data row into a [`RegistryRecord`] with a normalized tax id.

use crate::app::models::RegistryRecord;
use crate::app::services::delimited::{ColumnMapping, record_field};
use crate::app::services::tax_id;
use crate::constants::{DEFAULT_OPERATOR_TYPE, DEFAULT_REGION, registry_columns};
use crate::{Error, Result};
use csv::ByteRecord;

/// Column positions of a registry file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryColumns {
    pub tax_id: usize,
    pub legal_name: usize,
    pub registration_number: usize,
    pub operator_type: Option<usize>,
    pub region: Option<usize>,
}

impl RegistryColumns {
    /// Resolve registry columns from a header mapping
    ///
    /// # Errors
    /// * Returns `Error::RegistryFormat` when the tax id, legal name or
    ///   registration number column is missing
    pub fn resolve(mapping: &ColumnMapping, file: &str) -> Result<Self> {
        let required = |names: &[&str]| {
            mapping.find(names).ok_or_else(|| {
                Error::registry_format(
                    file,
                    format!("Missing required column '{}'", names.join("' / '")),
                )
            })
        };

        Ok(Self {
            tax_id: required(registry_columns::TAX_ID)?,
            legal_name: required(registry_columns::LEGAL_NAME)?,
            registration_number: required(registry_columns::REGISTRATION_NUMBER)?,
            operator_type: mapping.find(registry_columns::OPERATOR_TYPE),
            region: mapping.find(registry_columns::REGION),
        })
    }

    /// Minimum record length needed to read the join columns
    pub fn min_len(&self) -> usize {
        self.tax_id.max(self.registration_number) + 1
    }
}

/// Parse a registry row
///
/// Returns `None` when the row is too short to hold both the tax id and the
/// registration number. Optional columns fall back to `N/A` / `BR` only when
/// the column is absent from the header; a short row yields an empty value.
pub fn parse_registry_record(record: &ByteRecord, columns: &RegistryColumns) -> Option<RegistryRecord> {
    if record.len() < columns.min_len() {
        return None;
    }

    let field = |index: usize| record_field(record, index).unwrap_or_default();
    let optional = |index: Option<usize>, default: &str| match index {
        Some(index) => field(index),
        None => default.to_string(),
    };

    Some(RegistryRecord::new(
        tax_id::normalize(&field(columns.tax_id)),
        field(columns.legal_name),
        field(columns.registration_number),
        optional(columns.operator_type, DEFAULT_OPERATOR_TYPE),
        optional(columns.region, DEFAULT_REGION),
    ))
}

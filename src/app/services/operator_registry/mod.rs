//! Operator registry service for O(1) two-hop lookups
//!
//! This module loads the ANS operator registry (CADOP) once and keeps two
//! read-only indices:
//!
//! - tax id (normalized CNPJ) -> [`RegistryRecord`]
//! - registration number (as printed) -> tax id, the bridge table
//!
//! Filing lines only carry a registration number while the business key of
//! the join is the tax id, so a line is resolved in two hops:
//! [`OperatorRegistry::resolve_tax_id`] then [`OperatorRegistry::lookup_record`].

use crate::app::models::RegistryRecord;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

pub mod loader;
pub mod metadata;
pub mod parser;
pub mod sanitizer;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use metadata::{LoadStats, RegistryMetadata};
pub use sanitizer::{SanitizeStats, sanitize_registry_file};

/// Operator registry with both lookup indices
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    /// Registry records indexed by normalized tax id
    pub(crate) by_tax_id: HashMap<String, RegistryRecord>,

    /// Bridge table: registration number -> normalized tax id
    pub(crate) tax_id_by_registration: HashMap<String, String>,

    /// File the registry was loaded from
    pub(crate) source_path: PathBuf,

    /// Timestamp when the registry was loaded
    pub(crate) load_time: Instant,
}

impl OperatorRegistry {
    /// Create a new empty registry
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            by_tax_id: HashMap::new(),
            tax_id_by_registration: HashMap::new(),
            source_path,
            load_time: Instant::now(),
        }
    }

    /// Build a registry from records already in memory
    pub fn from_records(records: impl IntoIterator<Item = RegistryRecord>) -> Self {
        let mut registry = Self::new(PathBuf::from("<memory>"));
        for record in records {
            registry.insert(record);
        }
        registry
    }

    /// First hop: translate a filing registration number into a tax id
    pub fn resolve_tax_id(&self, registration_number: &str) -> Option<&str> {
        self.tax_id_by_registration
            .get(registration_number)
            .map(String::as_str)
    }

    /// Second hop: fetch the registry record for a normalized tax id
    pub fn lookup_record(&self, tax_id: &str) -> Option<&RegistryRecord> {
        self.by_tax_id.get(tax_id)
    }

    /// Both hops composed
    #[cfg(test)]
    pub(crate) fn lookup_by_registration(&self, registration_number: &str) -> Option<&RegistryRecord> {
        self.resolve_tax_id(registration_number)
            .and_then(|tax_id| self.lookup_record(tax_id))
    }

    /// Number of operators indexed by tax id
    pub fn operator_count(&self) -> usize {
        self.by_tax_id.len()
    }

    /// Number of registration numbers in the bridge table
    pub fn bridge_count(&self) -> usize {
        self.tax_id_by_registration.len()
    }

    /// Get registry metadata
    pub fn metadata(&self) -> RegistryMetadata {
        RegistryMetadata {
            source_path: self.source_path.clone(),
            operator_count: self.by_tax_id.len(),
            bridge_count: self.tax_id_by_registration.len(),
            load_time: self.load_time,
        }
    }

    /// Index one record in both tables
    ///
    /// Records with an empty tax id are ignored. A later record with the same
    /// tax id or registration number replaces the earlier one; the return
    /// value tells whether a tax id was replaced.
    pub(crate) fn insert(&mut self, record: RegistryRecord) -> bool {
        if record.tax_id.is_empty() {
            return false;
        }

        if !record.registration_number.is_empty() {
            self.tax_id_by_registration
                .insert(record.registration_number.clone(), record.tax_id.clone());
        }

        self.by_tax_id
            .insert(record.tax_id.clone(), record)
            .is_some()
    }
}

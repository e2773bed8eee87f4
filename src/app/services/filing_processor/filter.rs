//! Category filter applied to the description column of filing lines

use crate::app::services::delimited::record_field;
use csv::ByteRecord;

/// Case-insensitive substring filter on the account description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    phrase: String,
    needle: String,
}

impl CategoryFilter {
    pub fn new(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        let needle = phrase.to_lowercase();
        Self { phrase, needle }
    }

    /// The phrase as configured
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Check a description value
    pub fn matches(&self, description: &str) -> bool {
        description.to_lowercase().contains(&self.needle)
    }

    /// Check the description column of a record
    ///
    /// A record too short to hold the column never matches.
    pub fn matches_record(&self, record: &ByteRecord, description_index: usize) -> bool {
        record_field(record, description_index)
            .map(|description| self.matches(&description))
            .unwrap_or(false)
    }
}

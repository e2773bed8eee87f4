//! Filter-join stage for ANS quarterly filings
//!
//! This module streams the text tables inside each quarterly archive, keeps
//! only the lines of the configured expense category and joins them against
//! the operator registry.
//!
//! # Architecture
//!
//! - [`filter`] - Case-insensitive category filter on the description column
//! - [`join`] - Two-hop registry join and row composition
//! - [`processor`] - Entry and line streaming, export and accumulator feeding
//! - [`stats`] - Run counters
//!
//! # Per-line pipeline
//!
//! 1. **Filter**: lines whose description lacks the phrase are dropped first
//! 2. **Amount**: `.`-decimal or Brazilian `1.234,56`; anything else is skipped
//! 3. **Join**: registration number -> tax id -> registry record
//! 4. **Emit**: the row is appended to the consolidated export at once
//! 5. **Aggregate**: rows with a known name and region feed their group
//!
//! Unmatched lines are never dropped; they are written with sentinel values
//! so the consolidated export keeps every accepted amount.

pub mod filter;
pub mod join;
pub mod processor;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use filter::CategoryFilter;
pub use join::{JoinOutcome, join_line};
pub use processor::{FilingColumns, FilingProcessor, StageOutput, parse_filing_line};
pub use stats::ProcessingStats;

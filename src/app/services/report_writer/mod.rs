//! Export writers
//!
//! - [`consolidated`] - row-level export, streamed while archives are read
//! - [`summary`] - per-group export, written once after the last archive

pub mod consolidated;
pub mod summary;

pub use consolidated::ConsolidatedWriter;
pub use summary::{summary_record, write_summary, write_summary_file};

//! ANS Processor Library
//!
//! A Rust library for joining the quarterly accounting filings published by the
//! Brazilian health regulator (ANS) against the operator registry (CADOP) and
//! producing consolidated and aggregated expense exports.
//!
//! This library provides tools for:
//! - Normalizing and validating CNPJ tax identifiers (modulo-11 checksum)
//! - Loading and indexing the operator registry for O(1) two-hop lookups
//! - Streaming filing archives line by line with a category filter
//! - Accumulating per-operator statistics in a single pass (Welford)
//! - Writing the consolidated and aggregated `;`-delimited exports

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod pipeline;
    pub mod services {
        pub mod aggregation;
        pub mod archive_source;
        pub mod delimited;
        pub mod filing_processor;
        pub mod operator_registry;
        pub mod report_writer;
        pub mod tax_id;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{GroupKey, JoinedExpenseRow, QuarterPeriod, RegistryRecord};
pub use app::pipeline::{ExpensePipeline, RunSummary};
pub use config::Config;

/// Result type alias for the ANS processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ANS processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or writing error
    #[error("CSV error in '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Registry source does not exist; the run cannot continue without it
    #[error("Registry file not found: {path}")]
    MissingRegistryFile { path: String },

    /// Registry exists but cannot be indexed
    #[error("Registry format error in '{file}': {message}")]
    RegistryFormat { file: String, message: String },

    /// Archive could not be downloaded
    #[error("Failed to fetch archive '{archive}': {message}")]
    ArchiveFetch { archive: String, message: String },

    /// Archive could not be opened or read as ZIP
    #[error("Archive error in '{archive}': {message}")]
    Archive {
        archive: String,
        message: String,
        #[source]
        source: Option<zip::result::ZipError>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a missing registry error
    pub fn missing_registry_file(path: impl Into<String>) -> Self {
        Self::MissingRegistryFile { path: path.into() }
    }

    /// Create a registry format error
    pub fn registry_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistryFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an archive fetch error
    pub fn archive_fetch(archive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArchiveFetch {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Create an archive read error
    pub fn archive(
        archive: impl Into<String>,
        message: impl Into<String>,
        source: Option<zip::result::ZipError>,
    ) -> Self {
        Self::Archive {
            archive: archive.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the error only affects a single archive and the run may go on
    pub fn is_archive_scoped(&self) -> bool {
        matches!(self, Self::ArchiveFetch { .. } | Self::Archive { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive {
            archive: "unknown".to_string(),
            message: "ZIP processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let archive = error
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self::ArchiveFetch {
            archive,
            message: error.to_string(),
        }
    }
}

//! End-to-end expense run
//!
//! Wires the stages together in their fixed order:
//!
//! 1. Optional registry sanitation, persisted before anything reads it
//! 2. Registry load; the indices are frozen from here on
//! 3. Archives in configured order through the filter-join stage
//! 4. Aggregated export once the last archive is consumed
//!
//! Registry and configuration failures abort the run. A failed download or
//! a corrupt archive only skips that archive.

use crate::app::services::archive_source::{
    ArchiveFetcher, ArchiveSpec, discover_local, remote_specs,
};
use crate::app::services::filing_processor::{CategoryFilter, FilingProcessor, ProcessingStats};
use crate::app::services::operator_registry::{
    LoadStats, OperatorRegistry, SanitizeStats, sanitize_registry_file,
};
use crate::app::services::report_writer::{ConsolidatedWriter, write_summary_file};
use crate::config::Config;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Registry file that was loaded
    pub registry_path: PathBuf,
    /// Registry loading statistics
    pub registry: LoadStats,
    /// Sanitation statistics, when the pass ran
    pub sanitize: Option<SanitizeStats>,
    /// Filter-join statistics over every archive
    pub processing: ProcessingStats,
    /// Rows in the aggregated export
    pub groups_written: usize,
    pub consolidated_path: PathBuf,
    pub aggregated_path: PathBuf,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether every configured archive was processed
    pub fn is_successful(&self) -> bool {
        self.processing.archives_failed == 0
    }

    /// Get a one-line summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} archives ({} failed), {} rows written, {} groups in {:.2}s",
            self.processing.archives_processed + self.processing.archives_failed,
            self.processing.archives_failed,
            self.processing.rows_written,
            self.groups_written,
            self.elapsed.as_secs_f64()
        )
    }
}

/// One configured expense run
#[derive(Debug, Clone)]
pub struct ExpensePipeline {
    config: Config,
    show_progress: bool,
}

impl ExpensePipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Show a progress bar over archives
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Archives of this run, in processing order
    pub fn archive_specs(&self) -> Result<Vec<ArchiveSpec>> {
        let sources = &self.config.sources;
        match &sources.input_dir {
            Some(dir) => discover_local(dir, &sources.archives),
            None => Ok(remote_specs(&sources.base_url, &sources.archives)),
        }
    }

    /// Execute the run
    ///
    /// # Errors
    /// * `Error::Configuration` for an invalid configuration
    /// * `Error::MissingRegistryFile` / `Error::RegistryFormat` when the
    ///   registry cannot be loaded
    /// * `Error::Io` / `Error::CsvParsing` when an export cannot be written
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let config = &self.config;

        config.validate()?;
        debug!("Running with configuration: {:?}", config);

        fs::create_dir_all(&config.output.dir).map_err(|e| {
            Error::io(
                format!("Failed to create output directory {}", config.output.dir.display()),
                e,
            )
        })?;

        let sanitize = if config.registry.sanitize {
            Some(sanitize_registry_file(&config.registry.path)?)
        } else {
            None
        };

        let (registry, load_stats) = OperatorRegistry::load_from_file(&config.registry.path)?;
        debug!("{}", registry.metadata().summary());

        let specs = self.archive_specs()?;
        if specs.is_empty() {
            warn!("No archives to process");
        }

        let fetcher = ArchiveFetcher::new(config.downloads_dir())?;
        let consolidated_path = config.consolidated_path();
        let writer = ConsolidatedWriter::create(&consolidated_path)?;
        let mut processor = FilingProcessor::new(
            &registry,
            CategoryFilter::new(&config.filter.category),
            &config.sources.default_year,
            writer,
        );

        let progress_bar = self
            .show_progress
            .then(|| create_archive_progress_bar(specs.len() as u64));

        for spec in &specs {
            if let Some(pb) = &progress_bar {
                pb.set_message(format!("Processing {}", spec.name));
            }

            let result = match fetcher.open(spec).await {
                Ok(archive) => processor.process_archive(&spec.name, archive),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {}
                Err(e) if e.is_archive_scoped() => {
                    warn!("Skipping archive {}: {}", spec.name, e);
                    processor.stats_mut().add_archive_failure(e.to_string());
                }
                Err(e) => return Err(e),
            }

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Archives processed");
        }

        let stage = processor.finish()?;
        info!("Consolidated export written to {}", consolidated_path.display());
        info!("{}", stage.stats.summary());

        if stage.aggregator.is_empty() {
            warn!("No rows were aggregated");
        } else {
            info!(
                "Aggregated {} rows into {} groups",
                stage.aggregator.contribution_count(),
                stage.aggregator.group_count()
            );
        }

        let aggregated_path = config.aggregated_path();
        let groups_written = write_summary_file(stage.aggregator, &aggregated_path)?;

        let summary = RunSummary {
            started_at,
            registry_path: config.registry.path.clone(),
            registry: load_stats,
            sanitize,
            processing: stage.stats,
            groups_written,
            consolidated_path,
            aggregated_path,
            elapsed: start_time.elapsed(),
        };

        info!("Run complete: {}", summary.summary());
        Ok(summary)
    }
}

fn create_archive_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message("Initializing...");
    pb
}

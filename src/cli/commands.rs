//! Command implementations for the ANS processor CLI
//!
//! This module contains the command execution logic: logging setup,
//! layered configuration loading and the final run report.

use crate::app::pipeline::{ExpensePipeline, RunSummary};
use crate::app::services::tax_id;
use crate::cli::args::{Args, Commands, OutputFormat, ProcessArgs, ValidateCnpjArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use indicatif::HumanDuration;
use serde::Serialize;
use tracing::{debug, info};

/// Main command runner
///
/// Sets up logging, then dispatches to the selected subcommand.
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match args.command {
        Commands::Process(process_args) => run_process(process_args).await,
        Commands::ValidateCnpj(validate_args) => run_validate_cnpj(&validate_args),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ans_processor={}", log_level)));

    if args.is_quiet() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration: file (explicit or per-user default), then CLI overrides
fn load_configuration(args: &ProcessArgs) -> Result<Config> {
    let config_file = match &args.config_file {
        Some(path) => Some(path.clone()),
        None => Config::default_path().filter(|path| path.exists()),
    };

    let config = match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            Config::load_from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => {
            info!("No config file found, using defaults");
            Config::default()
        }
    };

    let config = args.apply_to(config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_process(args: ProcessArgs) -> Result<()> {
    let config = load_configuration(&args)?;
    info!("Starting ANS expense processing");

    let show_progress = args.show_progress() && args.output_format == OutputFormat::Human;
    let summary = ExpensePipeline::new(config)
        .with_progress(show_progress)
        .run()
        .await?;

    match args.output_format {
        OutputFormat::Human => {
            if !args.quiet {
                print_human_report(&summary);
            }
        }
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(())
}

/// Print the run report for people
fn print_human_report(summary: &RunSummary) {
    let stats = &summary.processing;

    println!("\n{}", "ANS Expense Processing Complete".bright_green().bold());
    println!(
        "  {} {} ({} operators indexed, {} invalid CNPJ)",
        "Registry:".bright_cyan(),
        summary.registry_path.display(),
        summary.registry.records_indexed,
        summary.registry.invalid_tax_ids
    );
    println!(
        "  {} {} processed, {} failed",
        "Archives:".bright_cyan(),
        stats.archives_processed.to_string().bright_white().bold(),
        stats.archives_failed
    );
    println!(
        "  {} {} read, {} filtered out, {} malformed amounts",
        "Lines:".bright_cyan(),
        stats.lines_read,
        stats.lines_filtered_out,
        stats.malformed_amounts
    );
    println!(
        "  {} {} written ({:.1}% matched, {} unmatched)",
        "Rows:".bright_cyan(),
        stats.rows_written.to_string().bright_white().bold(),
        stats.match_rate(),
        stats.unmatched_rows
    );
    println!(
        "  {} {}",
        "Groups:".bright_cyan(),
        summary.groups_written.to_string().bright_white().bold()
    );
    println!(
        "  {} {} (started {})",
        "Time:".bright_cyan(),
        HumanDuration(summary.elapsed),
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("\n{}", "Output Files:".bright_cyan());
    println!("  {}", summary.consolidated_path.display());
    println!("  {}", summary.aggregated_path.display());

    if !summary.is_successful() {
        println!("\n{}", "Skipped archives:".bright_yellow());
        for message in &stats.error_messages {
            println!("  {}", message.yellow());
        }
    }
    println!();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

/// Result of checking one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CnpjCheck {
    pub input: String,
    pub normalized: String,
    pub formatted: String,
    pub valid: bool,
}

impl CnpjCheck {
    pub fn new(input: &str) -> Self {
        let normalized = tax_id::normalize(input);
        Self {
            input: input.to_string(),
            formatted: tax_id::format(&normalized),
            valid: tax_id::is_valid(&normalized),
            normalized,
        }
    }
}

fn run_validate_cnpj(args: &ValidateCnpjArgs) -> Result<()> {
    let checks: Vec<CnpjCheck> = args.cnpjs.iter().map(|c| CnpjCheck::new(c)).collect();

    match args.output_format {
        OutputFormat::Human => {
            for check in &checks {
                let verdict = if check.valid {
                    "valid".bright_green()
                } else {
                    "invalid".bright_red()
                };
                println!("{:<24} {:<20} {}", check.input, check.formatted, verdict);
            }
        }
        OutputFormat::Json => print_json(&checks)?,
    }

    let invalid = checks.iter().filter(|c| !c.valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} identifiers are invalid", invalid, checks.len());
    }
    Ok(())
}

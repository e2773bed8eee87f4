//! Command-line argument definitions for the ANS processor
//!
//! This module defines the CLI interface using the clap derive API. Every
//! processing option overrides the matching configuration value.

use crate::config::Config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the ANS expense processor
///
/// Joins the quarterly accounting filings published by ANS with the
/// operator registry and writes consolidated and aggregated expense exports.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ans-processor",
    version,
    about = "Consolidate ANS health-operator expenses from quarterly filings",
    long_about = "Streams the quarterly accounting archives published by the Brazilian health \
                  regulator (ANS), keeps the claims expense lines, joins them with the operator \
                  registry (CADOP) by registration number and writes a consolidated export plus \
                  per-operator totals, quarterly averages and standard deviations."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process quarterly archives into the consolidated and aggregated exports
    Process(ProcessArgs),
    /// Normalize and check CNPJ tax identifiers
    ValidateCnpj(ValidateCnpjArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Configuration file (TOML)
    ///
    /// Defaults to ~/.config/ans-processor/config.toml when that file exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file (TOML)"
    )]
    pub config_file: Option<PathBuf>,

    /// Operator registry file (CADOP export)
    #[arg(
        short = 'r',
        long = "registry",
        value_name = "FILE",
        help = "Operator registry file"
    )]
    pub registry: Option<PathBuf>,

    /// Read archives from a local directory instead of downloading them
    #[arg(
        short = 'i',
        long = "input",
        value_name = "DIR",
        help = "Directory holding the quarterly archives"
    )]
    pub input_dir: Option<PathBuf>,

    /// Output directory for both exports
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for the exports"
    )]
    pub output_dir: Option<PathBuf>,

    /// Base URL the archive names are appended to
    #[arg(long = "base-url", value_name = "URL", help = "Base URL of the archives")]
    pub base_url: Option<String>,

    /// Archive names in processing order
    #[arg(
        long = "archives",
        value_name = "LIST",
        value_delimiter = ',',
        help = "Comma-separated archive names, e.g. 1T2025.zip,2T2025.zip"
    )]
    pub archives: Option<Vec<String>>,

    /// Phrase searched in the account description
    #[arg(
        long = "filter",
        value_name = "TEXT",
        help = "Expense category phrase (case-insensitive)"
    )]
    pub filter: Option<String>,

    /// Rewrite the registry in canonical form before loading it
    #[arg(
        long = "sanitize-registry",
        help = "Normalize registry separators and CNPJ in place before loading"
    )]
    pub sanitize_registry: bool,

    /// Keep downloaded archives under the output directory
    #[arg(long = "keep-downloads", help = "Keep downloaded archives")]
    pub keep_downloads: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the run report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the validate-cnpj command
#[derive(Debug, Clone, Parser)]
pub struct ValidateCnpjArgs {
    /// Identifiers to check, formatted or not
    #[arg(required = true, value_name = "CNPJ")]
    pub cnpjs: Vec<String>,

    /// Output format for the results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get logging level for the selected command
    pub fn get_log_level(&self) -> &'static str {
        match &self.command {
            Commands::Process(args) => args.get_log_level(),
            Commands::ValidateCnpj(_) => "warn",
        }
    }

    /// Whether logs should be kept to errors only
    pub fn is_quiet(&self) -> bool {
        matches!(&self.command, Commands::Process(args) if args.quiet)
    }
}

impl ProcessArgs {
    /// Get logging level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(path) = &self.registry {
            config = config.with_registry_path(path);
        }
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(archives) = &self.archives {
            config = config.with_archives(archives.iter().cloned());
        }
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter);
        }
        if self.sanitize_registry {
            config = config.with_sanitize_registry();
        }
        if self.keep_downloads {
            config = config.with_keep_downloads();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_FILTER_TEXT;

    fn parse_process(argv: &[&str]) -> ProcessArgs {
        let mut full = vec!["ans-processor", "process"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Commands::Process(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_process_defaults() {
        let args = parse_process(&[]);

        assert!(args.config_file.is_none());
        assert!(args.archives.is_none());
        assert!(!args.sanitize_registry);
        assert_eq!(args.output_format, OutputFormat::Human);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());
    }

    #[test]
    fn test_archive_list_split_on_commas() {
        let args = parse_process(&["--archives", "1T2025.zip,3T2025.zip"]);

        assert_eq!(
            args.archives,
            Some(vec!["1T2025.zip".to_string(), "3T2025.zip".to_string()])
        );
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse_process(&["-v"]).get_log_level(), "info");
        assert_eq!(parse_process(&["-vv"]).get_log_level(), "debug");
        assert_eq!(parse_process(&["-vvv"]).get_log_level(), "trace");

        let quiet = parse_process(&["-q"]);
        assert_eq!(quiet.get_log_level(), "error");
        assert!(!quiet.show_progress());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["ans-processor", "process", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_applied_to_config() {
        let args = parse_process(&[
            "-r",
            "cadop.csv",
            "-i",
            "archives",
            "-o",
            "out",
            "--filter",
            "Eventos",
            "--sanitize-registry",
        ]);

        let config = args.apply_to(Config::default());

        assert_eq!(config.registry.path, PathBuf::from("cadop.csv"));
        assert_eq!(config.sources.input_dir, Some(PathBuf::from("archives")));
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.filter.category, "Eventos");
        assert!(config.registry.sanitize);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let config = parse_process(&[]).apply_to(Config::default());

        assert_eq!(config, Config::default());
        assert_eq!(config.filter.category, DEFAULT_FILTER_TEXT);
    }

    #[test]
    fn test_validate_cnpj_requires_values() {
        assert!(Args::try_parse_from(["ans-processor", "validate-cnpj"]).is_err());

        let args =
            Args::try_parse_from(["ans-processor", "validate-cnpj", "11.222.333/0001-81", "123"])
                .unwrap();
        match args.command {
            Commands::ValidateCnpj(v) => assert_eq!(v.cnpjs.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}

//! Configuration management and validation.
//!
//! Provides the run configuration: where archives and the registry come
//! from, which expense category is kept and where the exports go. Every
//! section has defaults, so a TOML file only needs the values it changes.

use crate::constants::{
    AGGREGATED_FILENAME, CONFIG_DIR_NAME, CONFIG_FILENAME, CONSOLIDATED_FILENAME,
    DEFAULT_ARCHIVES, DEFAULT_BASE_URL, DEFAULT_FILTER_TEXT, DEFAULT_OUTPUT_DIR,
    DEFAULT_REGISTRY_PATH, DEFAULT_YEAR, DOWNLOADS_DIR_NAME, YEAR_LEN,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the quarterly archives come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Base URL the archive names are appended to
    pub base_url: String,

    /// Archive names in processing order
    pub archives: Vec<String>,

    /// Read archives from this directory instead of downloading them
    pub input_dir: Option<PathBuf>,

    /// Keep downloaded archives under the output directory
    pub keep_downloads: bool,

    /// Year used when an archive name carries none
    pub default_year: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            archives: DEFAULT_ARCHIVES.iter().map(|s| s.to_string()).collect(),
            input_dir: None,
            keep_downloads: false,
            default_year: DEFAULT_YEAR.to_string(),
        }
    }
}

/// Operator registry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry file (CADOP export)
    pub path: PathBuf,

    /// Rewrite the registry in canonical form before loading it
    pub sanitize: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            sanitize: false,
        }
    }
}

/// Category filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Phrase searched case-insensitively in the description column
    pub category: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category: DEFAULT_FILTER_TEXT.to_string(),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory both exports are written to
    pub dir: PathBuf,

    /// File name of the consolidated export
    pub consolidated_file: String,

    /// File name of the aggregated export
    pub aggregated_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            consolidated_file: CONSOLIDATED_FILENAME.to_string(),
            aggregated_file: AGGREGATED_FILENAME.to_string(),
        }
    }
}

/// Global configuration for an expense run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub registry: RegistryConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// * Returns `Error::Io` if the file cannot be read
    /// * Returns `Error::Configuration` if the file is not valid TOML
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Per-user configuration file, e.g. `~/.config/ans-processor/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
    }

    /// Check the configuration before a run
    ///
    /// # Errors
    /// * Returns `Error::Configuration` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.sources.input_dir.is_none() {
            if !self.sources.base_url.starts_with("http://")
                && !self.sources.base_url.starts_with("https://")
            {
                return Err(Error::configuration(format!(
                    "Base URL must be http(s): '{}'",
                    self.sources.base_url
                )));
            }
            if self.sources.archives.is_empty() {
                return Err(Error::configuration("No archives configured for download"));
            }
        }

        if self.sources.archives.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::configuration("Archive names must not be empty"));
        }

        let year = &self.sources.default_year;
        if year.len() != YEAR_LEN || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::configuration(format!(
                "Default year must have {} digits: '{}'",
                YEAR_LEN, year
            )));
        }

        if self.filter.category.trim().is_empty() {
            return Err(Error::configuration("Filter category must not be empty"));
        }

        if self.output.consolidated_file.is_empty() || self.output.aggregated_file.is_empty() {
            return Err(Error::configuration("Export file names must not be empty"));
        }
        if self.output.consolidated_file == self.output.aggregated_file {
            return Err(Error::configuration(format!(
                "Both exports would be written to '{}'",
                self.output.consolidated_file
            )));
        }

        Ok(())
    }

    /// Full path of the consolidated export
    pub fn consolidated_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.consolidated_file)
    }

    /// Full path of the aggregated export
    pub fn aggregated_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.aggregated_file)
    }

    /// Where downloads are kept, when enabled
    pub fn downloads_dir(&self) -> Option<PathBuf> {
        self.sources
            .keep_downloads
            .then(|| self.output.dir.join(DOWNLOADS_DIR_NAME))
    }

    /// Read archives from a local directory
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources.input_dir = Some(dir.into());
        self
    }

    /// Set the archive list
    pub fn with_archives<S: Into<String>>(mut self, archives: impl IntoIterator<Item = S>) -> Self {
        self.sources.archives = archives.into_iter().map(Into::into).collect();
        self
    }

    /// Set the download base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.sources.base_url = base_url.into();
        self
    }

    /// Keep downloaded archives
    pub fn with_keep_downloads(mut self) -> Self {
        self.sources.keep_downloads = true;
        self
    }

    /// Set the registry file
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry.path = path.into();
        self
    }

    /// Enable the registry sanitation pass
    pub fn with_sanitize_registry(mut self) -> Self {
        self.registry.sanitize = true;
        self
    }

    /// Set the category filter phrase
    pub fn with_filter(mut self, category: impl Into<String>) -> Self {
        self.filter.category = category.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.sources.archives, DEFAULT_ARCHIVES);
        assert_eq!(config.consolidated_path(), PathBuf::from("TEMP/consolidado_despesas.csv"));
        assert_eq!(config.aggregated_path(), PathBuf::from("TEMP/despesas_agregadas.csv"));
        assert!(config.downloads_dir().is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[sources]\narchives = [\"4T2024.zip\"]\n\n[output]\ndir = \"out\"\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.sources.archives, vec!["4T2024.zip"]);
        assert_eq!(config.sources.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.aggregated_file, AGGREGATED_FILENAME);
        assert_eq!(config.filter.category, DEFAULT_FILTER_TEXT);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[sources\narchives = 3").unwrap();

        let result = Config::load_from_file(&path);
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::default().with_base_url("ftp://x").validate().is_err());
        assert!(Config::default().with_archives(Vec::<String>::new()).validate().is_err());
        assert!(Config::default().with_filter("  ").validate().is_err());

        let mut config = Config::default();
        config.sources.default_year = "25".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.aggregated_file = config.output.consolidated_file.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_mode_needs_no_url() {
        let config = Config::default()
            .with_input_dir("archives")
            .with_base_url("")
            .with_archives(Vec::<String>::new());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_registry_path("cadop.csv")
            .with_sanitize_registry()
            .with_output_dir("out")
            .with_keep_downloads();

        assert_eq!(config.registry.path, PathBuf::from("cadop.csv"));
        assert!(config.registry.sanitize);
        assert_eq!(config.downloads_dir(), Some(PathBuf::from("out/downloads")));
    }
}

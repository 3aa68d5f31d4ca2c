//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.travelboard.toml` files.

use crate::cli::OutputFormat;
use crate::loader::{DataSource, LoadOptions, DEFAULT_SOURCE};
use crate::models::{LastMinuteRule, LAST_MINUTE_LABEL, LAST_MINUTE_MAX_DAYS};
use crate::navigation::{self, NavigationRequest};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".travelboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Last-minute classification settings.
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "dashboard.html".to_string()
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path or URL of the JSON dataset.
    #[serde(default = "default_source")]
    pub source: String,

    /// Request timeout for remote datasets. Unset means no timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Drop malformed records instead of rejecting the dataset.
    #[serde(default)]
    pub skip_invalid_records: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            timeout_seconds: None,
            skip_invalid_records: false,
        }
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Last-minute purchase classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Lead-time label that marks a purchase as last-minute.
    #[serde(default = "default_last_minute_label")]
    pub last_minute_label: String,

    /// Purchases made at most this many days ahead are last-minute.
    #[serde(default = "default_last_minute_max_days")]
    pub last_minute_max_days: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            last_minute_label: default_last_minute_label(),
            last_minute_max_days: default_last_minute_max_days(),
        }
    }
}

fn default_last_minute_label() -> String {
    LAST_MINUTE_LABEL.to_string()
}

fn default_last_minute_max_days() -> f64 {
    LAST_MINUTE_MAX_DAYS
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Per-person detail page targeted by the person cards.
    #[serde(default = "default_detail_page")]
    pub detail_page: String,

    /// Message shown when there is no data.
    #[serde(default = "default_empty_message")]
    pub empty_message: String,

    /// Text shown in the potential-savings slot.
    #[serde(default = "default_savings_placeholder")]
    pub savings_placeholder: String,

    /// Navigation buttons on the HTML dashboard, as `target:category`.
    #[serde(default = "navigation::default_requests")]
    pub navigation: Vec<NavigationRequest>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            detail_page: default_detail_page(),
            empty_message: default_empty_message(),
            savings_placeholder: default_savings_placeholder(),
            navigation: navigation::default_requests(),
        }
    }
}

fn default_title() -> String {
    "Dashboard de Viagens".to_string()
}

fn default_detail_page() -> String {
    "pessoa.html".to_string()
}

fn default_empty_message() -> String {
    "Nenhum dado disponível.".to_string()
}

fn default_savings_placeholder() -> String {
    "-".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        if self.data.source.trim().is_empty() {
            bail!("data.source must not be empty");
        }
        if self.data.timeout_seconds == Some(0) {
            bail!("data.timeout_seconds must be at least 1");
        }
        if !self.classification.last_minute_max_days.is_finite() {
            bail!("classification.last_minute_max_days must be a finite number");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.source = data.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(timeout) = args.timeout {
            self.data.timeout_seconds = Some(timeout);
        }

        // Flags always override
        if args.skip_invalid {
            self.data.skip_invalid_records = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The dataset location.
    pub fn source(&self) -> DataSource {
        DataSource::parse(&self.data.source)
    }

    /// Loader options derived from the data settings.
    pub fn load_options(&self, show_progress: bool) -> LoadOptions {
        LoadOptions {
            timeout: self.data.timeout_seconds.map(Duration::from_secs),
            skip_invalid: self.data.skip_invalid_records,
            show_progress,
        }
    }

    /// The configured last-minute classification rule.
    pub fn last_minute_rule(&self) -> LastMinuteRule {
        LastMinuteRule {
            label: self.classification.last_minute_label.clone(),
            max_days: self.classification.last_minute_max_days,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.source, "data/dados.json");
        assert_eq!(config.general.format, OutputFormat::Html);
        assert_eq!(config.last_minute_rule(), LastMinuteRule::default());
        assert_eq!(config.report.savings_placeholder, "-");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "relatorio.md"
format = "markdown"
verbose = true

[data]
source = "https://example.com/dados.json"
timeout_seconds = 30
skip_invalid_records = true

[classification]
last_minute_label = "urgente"
last_minute_max_days = 2
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "relatorio.md");
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert!(config.general.verbose);
        assert!(config.source().is_remote());
        assert!(config.data.skip_invalid_records);

        let options = config.load_options(false);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert!(options.skip_invalid);

        let rule = config.last_minute_rule();
        assert_eq!(rule.label, "urgente");
        assert_eq!(rule.max_days, 2.0);

        assert_eq!(config.report.detail_page, "pessoa.html");
        assert_eq!(config.report.navigation, navigation::default_requests());
    }

    #[test]
    fn test_parse_navigation_buttons() {
        let config: Config =
            toml::from_str("[report]\nnavigation = [\"report:anual\", \"analysis:custos\"]\n")
                .unwrap();
        assert_eq!(
            config.report.navigation,
            vec![
                NavigationRequest::new(navigation::NavigationTarget::Report, "anual"),
                NavigationRequest::new(navigation::NavigationTarget::Analysis, "custos"),
            ]
        );

        let bad = toml::from_str::<Config>("[report]\nnavigation = [\"mapa:rotas\"]\n");
        assert!(bad.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.data.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[data]\nsource = \"viagens.json\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data.source, "viagens.json");
        assert_eq!(config.general.output, "dashboard.html");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[classification]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.data.source, "data/dados.json");
        assert_eq!(reparsed.report.navigation.len(), 3);
    }
}

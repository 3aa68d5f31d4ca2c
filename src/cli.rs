//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::navigation::NavigationRequest;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Travelboard - travel expense dashboard
///
/// Loads a JSON dataset of travel records, aggregates totals, last-minute
/// purchases and per-person spend, and writes a dashboard page.
///
/// Examples:
///   travelboard
///   travelboard --data ../data/dados.json --output painel.html
///   travelboard --data https://example.com/dados.json --format json
///   travelboard --person "Ana Souza" --output pessoa.html
///   travelboard --import-csv ./csv_entrada --data ./data/dados.json
///   travelboard --navigate report:mensal
///   travelboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset location (file path or http(s) URL)
    ///
    /// Defaults to data/dados.json or the value in .travelboard.toml.
    /// Also the output path when used with --import-csv.
    #[arg(short, long, value_name = "PATH|URL", env = "TRAVELBOARD_DATA")]
    pub data: Option<String>,

    /// Output file path for the dashboard
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Render the detail view of a single traveler instead of the overview
    #[arg(short, long, value_name = "NAME")]
    pub person: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .travelboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds for remote datasets
    ///
    /// By default a remote fetch waits indefinitely.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Drop malformed records instead of rejecting the whole dataset
    #[arg(long)]
    pub skip_invalid: bool,

    /// Exit with code 2 when the dataset could not be loaded
    ///
    /// The empty-state dashboard is still written.
    #[arg(long)]
    pub strict: bool,

    /// Acknowledge a navigation request and exit
    ///
    /// Format: TARGET:CATEGORY, where TARGET is dashboard, analysis or report.
    #[arg(long, value_name = "TARGET:CATEGORY")]
    pub navigate: Option<NavigationRequest>,

    /// Convert a directory of CSV exports into the JSON dataset and exit
    #[arg(long, value_name = "DIR", conflicts_with_all = ["person", "navigate"])]
    pub import_csv: Option<PathBuf>,

    /// Generate a default .travelboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone HTML page (default)
    #[default]
    Html,
    /// Markdown document
    Markdown,
    /// JSON view-model
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if data.trim().is_empty() {
                return Err("Data location must not be empty".to_string());
            }
        }

        if let Some(ref person) = self.person {
            if person.is_empty() {
                return Err("Person name must not be empty".to_string());
            }
        }

        if let Some(ref dir) = self.import_csv {
            if dir.exists() && !dir.is_dir() {
                return Err(format!("CSV input is not a directory: {}", dir.display()));
            }
            if let Some(ref data) = self.data {
                if data.starts_with("http://") || data.starts_with("https://") {
                    return Err("--import-csv needs a local --data path".to_string());
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `general.verbose` from the config file; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationTarget;

    fn make_args() -> Args {
        Args {
            data: None,
            output: None,
            format: None,
            person: None,
            config: None,
            verbose: false,
            quiet: false,
            timeout: None,
            skip_invalid: false,
            strict: false,
            navigate: None,
            import_csv: None,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_import_into_url() {
        let mut args = make_args();
        args.import_csv = Some(PathBuf::from("csv_entrada"));
        args.data = Some("https://example.com/dados.json".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "travelboard",
            "--data",
            "viagens.json",
            "--format",
            "markdown",
            "--navigate",
            "dashboard:financeiro",
        ])
        .unwrap();

        assert_eq!(args.data.as_deref(), Some("viagens.json"));
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        let request = args.navigate.unwrap();
        assert_eq!(request.target, NavigationTarget::Dashboard);
        assert_eq!(request.category, "financeiro");
    }
}

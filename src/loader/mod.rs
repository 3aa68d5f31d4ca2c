//! Dataset loading.
//!
//! Reads the travel dataset from a local file or an HTTP(S) URL. Loading
//! never fails from the caller's point of view: any problem is logged,
//! reported through [`LoadOutcome::error`], and an empty dataset is returned.

pub mod decode;

pub use decode::decode_records;

use crate::models::TravelRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default dataset location, relative to the working directory.
pub const DEFAULT_SOURCE: &str = "data/dados.json";

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote resource could not be fetched.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote resource answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is valid JSON but not an array.
    #[error("dataset must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    /// An element failed schema validation.
    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A file on disk.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl DataSource {
    /// Interpret a `--data` argument or config value.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataSource::Url(raw.to_string())
        } else {
            DataSource::Path(PathBuf::from(raw))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Url(_))
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Path(PathBuf::from(DEFAULT_SOURCE))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Options for a single load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Request timeout for remote sources (None waits indefinitely).
    pub timeout: Option<Duration>,
    /// Drop malformed records instead of rejecting the whole dataset.
    pub skip_invalid: bool,
    /// Show a spinner while fetching a remote source.
    pub show_progress: bool,
}

/// What a load produced.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Decoded records in source order; empty when `error` is set.
    pub records: Vec<TravelRecord>,
    /// Malformed records dropped while skipping was enabled.
    pub skipped: usize,
    /// The failure that forced an empty dataset, if any.
    pub error: Option<LoadError>,
}

impl LoadOutcome {
    fn failed(error: LoadError) -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            error: Some(error),
        }
    }
}

/// Load the dataset. Never returns an error; see [`LoadOutcome`].
pub async fn load(source: &DataSource, options: &LoadOptions) -> LoadOutcome {
    info!("Loading travel data from {}", source);

    let content = match read_source(source, options).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to load travel data: {}", e);
            return LoadOutcome::failed(e);
        }
    };

    match decode_records(&content, options.skip_invalid) {
        Ok(decoded) => {
            info!("Loaded {} travel records", decoded.records.len());
            LoadOutcome {
                records: decoded.records,
                skipped: decoded.skipped,
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to decode travel data: {}", e);
            LoadOutcome::failed(e)
        }
    }
}

async fn read_source(source: &DataSource, options: &LoadOptions) -> Result<String, LoadError> {
    match source {
        DataSource::Path(path) => {
            debug!("Reading {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LoadError::Io {
                    path: path.clone(),
                    source: e,
                })
        }
        DataSource::Url(url) => {
            let spinner = options.show_progress.then(|| fetch_spinner(url));
            let result = fetch(url, options.timeout).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            result
        }
    }
}

async fn fetch(url: &str, timeout: Option<Duration>) -> Result<String, LoadError> {
    let http_error = |source| LoadError::Http {
        url: url.to_string(),
        source,
    };

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(http_error)?;

    let response = client.get(url).send().await.map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(http_error)
}

fn fetch_spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

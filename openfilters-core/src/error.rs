use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a step's own logic.
pub type StepError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Step '{step}' configured for {filter_type} is not registered")]
    StepResolution { filter_type: String, step: String },

    #[error("Step '{step}' failed while running {filter_type}: {source}")]
    StepExecution {
        filter_type: String,
        step: String,
        #[source]
        source: StepError,
    },

    #[error("Invalid output from {filter_type}: field '{field}' {reason}")]
    InvalidOutput {
        filter_type: String,
        field: String,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read filters config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filters config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response encoding: {0}")]
    InvalidEncoding(String),

    #[error("No response available for {0}")]
    NotFound(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

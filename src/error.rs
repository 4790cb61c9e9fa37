use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PageError {
    #[error("missing config file datapages.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("no species configured and no data summary found in {0}")]
    NoSpecies(String),

    #[error("invalid source location: {0}")]
    InvalidLocation(String),

    #[error("dataset request failed: {0}")]
    DatasetHttp(String),

    #[error("dataset source returned status {status}: {message}")]
    DatasetStatus { status: u16, message: String },

    #[error("failed to decode dataset: {0}")]
    DatasetParse(String),

    #[error("references request failed: {0}")]
    ReferencesHttp(String),

    #[error("references service returned status {status}: {message}")]
    ReferencesStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("invalid filter pattern: {0}")]
    InvalidFilter(String),

    #[error("invalid accession: {0}")]
    MalformedAccession(String),
}

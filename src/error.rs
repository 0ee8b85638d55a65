// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run. Expected conditions (missing source files, dead
/// links, records without an id) are logged and absorbed instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no source data could be read from {dir}")]
    NoSourceData { dir: PathBuf },
    #[error("{path} not found; run `merge` first")]
    MissingMerged { path: PathBuf },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

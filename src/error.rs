// src/error.rs

//! Error types for loading, filtering and exporting tables.
//!
//! Parsing never fails: malformed text degrades into records with missing
//! cells. Errors only come from the outside world (file reads, the
//! terminal, the CSV writer) or from bad command-line filter arguments.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("invalid filter '{raw}': {reason}")]
    InvalidFilter { raw: String, reason: String },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ViewerError::Read {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

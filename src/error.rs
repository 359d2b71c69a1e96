use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemfoError {
    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O failure on a named file.
    #[error("{operation} '{}': {source}", .path.display())]
    File {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed counter or replay input.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unreadable or invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// CSV export or import failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The metric source produced nothing usable.
    #[error("metric source error: {0}")]
    Source(String),

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl MemfoError {
    /// Wrap `source` with the operation and path it failed on.
    pub fn file(operation: &'static str, path: &Path, source: io::Error) -> Self {
        MemfoError::File {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The underlying I/O error, if this is one.
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            MemfoError::Io(err) | MemfoError::File { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

//! All error types for the mclang crate.
//!
//! Setup errors abort a run before any mod is touched. Archive, parse, and
//! write errors are per-mod: the batch runner turns them into a
//! [`crate::ModOutcome`] and moves on to the next archive.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("setup error: {0}")]
    Setup(String),

    #[error("not an archive: {}: {reason}", path.display())]
    NotAnArchive { path: PathBuf, reason: String },

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("malformed translation: {0}")]
    MalformedTranslation(String),

    #[error("write error: {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Creates a new setup (fatal) error
    pub fn setup(message: impl Into<String>) -> Self {
        Error::Setup(message.into())
    }

    /// Creates a new not-an-archive error for the given path
    pub fn not_an_archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::NotAnArchive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new malformed translation error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedTranslation(message.into())
    }

    /// Wraps an I/O failure that happened while writing `path`
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Setup(_))
    }
}

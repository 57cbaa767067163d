//! Error types for CourseQA

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CourseQA Error
pub type Result<T> = std::result::Result<T, Error>;

/// CourseQA error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed registry {}: {reason}", path.display())]
    MalformedRegistry { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedRegistry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

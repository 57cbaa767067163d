//! Error types for spec generation

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error(transparent)]
    Registry(#[from] courseqa_common::Error),

    #[error("Spec file not found: {}", path.display())]
    MissingSpecFile { path: PathBuf },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type GenResult<T> = Result<T, GenError>;

use std::io;
use std::path::StripPrefixError;

use crate::core::lockfile::LockError;
use crate::core::merge::ort::error::MergeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path resolution error: {0}")]
    PathResolution(String),
    #[error("Directory creation error: {0}")]
    DirectoryCreation(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Error: {0}")]
    Generic(String),
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
    #[error("Pattern error: {0}")]
    Pattern(String),
    #[error("Lock error: {0}")]
    Lock(String),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl From<StripPrefixError> for Error {
    fn from(error: StripPrefixError) -> Self {
        Error::Generic(format!("Failed to strip path prefix: {}", error))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Pattern(format!("Invalid pattern: {}", err))
    }
}

impl From<LockError> for Error {
    fn from(error: LockError) -> Self {
        Error::Lock(format!("{:?}", error))
    }
}

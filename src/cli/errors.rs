//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::staging::StagingError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("portal connection failed: {0}")]
    Connect(DirectoryError),

    #[error("portal failure: {0}")]
    Directory(#[from] DirectoryError),

    #[error("cannot read package {path}: {source}")]
    PackageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! CLI-specific error types.

use cloud_driver::CloudError;
use thiserror::Error;

/// Errors that can occur in the cluster provisioner CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provider error, already normalized
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Provider name not known to this build
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Result could not be rendered as JSON
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    /// Spec file could not be parsed
    #[error("Invalid spec file {path}: {message}")]
    InvalidSpec { path: String, message: String },
}

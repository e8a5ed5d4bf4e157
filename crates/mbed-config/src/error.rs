//! Error types for mbed-config

use std::path::PathBuf;

use crate::model::TargetMetadata;

/// Result type for mbed-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, merging, or assembling configuration.
///
/// Every variant is fatal to the assembly: a partially assembled
/// configuration is never returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A descriptor is not valid JSON or does not have the expected shape
    #[error("Failed to parse descriptor {path}: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    /// A target override names a setting no `config` block declared
    #[error("Override of undeclared config key `{key}` in {origin}")]
    UnknownConfigKey { key: String, origin: String },

    /// A cumulative override value is not a list of strings
    #[error("Cumulative override `{key}` in {origin} must be a list of strings")]
    InvalidCumulativeValue { key: String, origin: String },

    /// The fixed-point iteration hit its pass limit
    #[error(
        "Configuration did not converge after {iterations} passes; last change: {previous} -> {current}"
    )]
    ConfigDidNotConverge {
        iterations: usize,
        previous: Box<TargetMetadata>,
        current: Box<TargetMetadata>,
    },

    /// An ignore file holds a pattern that cannot be compiled
    #[error("Invalid ignore pattern `{pattern}` in {path}: {message}")]
    InvalidIgnorePattern {
        path: PathBuf,
        pattern: String,
        message: String,
    },

    /// Assembly options could not be parsed
    #[error("Invalid assembly options: {message}")]
    InvalidOptions { message: String },

    /// Filesystem error from mbed-fs
    #[error(transparent)]
    Fs(#[from] mbed_fs::Error),
}

impl Error {
    pub(crate) fn descriptor(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DescriptorParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

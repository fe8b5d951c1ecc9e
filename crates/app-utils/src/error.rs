use core_claims::ClaimsError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the `app-utils` crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Model file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Model document is malformed or violates the schema rules
    #[error(transparent)]
    Model(#[from] ClaimsError),

    /// YAML parsing failed
    #[error("YAML parsing failed: {0}")]
    YamlParseError(String),

    /// File extension does not map to a known format
    #[error("Unsupported model format: '{0}' (expected .toml, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

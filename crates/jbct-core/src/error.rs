//! Error types for the JBCT core library.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for JBCT operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown chain template name
    #[error("Unknown chain template: {0}")]
    UnknownTemplate(String),
}

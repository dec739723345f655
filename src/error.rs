//! Startup error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning configuration into channels and sinks.
///
/// All of these are fatal to startup and are never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A transport spec has no `type`.
    #[error("transport {0} must provide a type")]
    MissingKind(String),

    /// A transport `type` string is not one of the known sink kinds.
    #[error("unknown transport type {0}")]
    UnknownKind(String),

    /// A file-backed transport has no `filename`.
    #[error("transport {0} must provide filename option")]
    MissingFilename(String),

    /// A network transport has no usable `url`.
    #[error("transport {key} has invalid url: {reason}")]
    InvalidUrl { key: String, reason: String },

    /// A declared category has no transport list.
    #[error("logger: {0} must provide transports option")]
    MissingTransports(String),

    /// A level name could not be parsed.
    #[error("unknown level {0}")]
    UnknownLevel(String),

    /// Creating a log directory or opening a log file failed.
    #[error("cannot prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for startup operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

//! Error types for container setup and configuration.
//!
//! Runtime failures (duplicate ids, exhausted retries) are reported as
//! [`Outcome`](idpath_types::Outcome)s, not through this type.

use thiserror::Error;

/// Errors raised while building generators and containers.
#[derive(Debug, Error)]
pub enum GenError {
    /// A container was configured to hand out zero-byte ids.
    #[error("id size can't be 0")]
    ZeroIdSize,

    /// The configuration text could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be rendered.
    #[error("config serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for setup operations.
pub type Result<T> = std::result::Result<T, GenError>;

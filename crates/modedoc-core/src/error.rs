//! Error types for modedoc configuration
//!
//! Transform runs never fail; only setting up a run (choosing a mode,
//! reading configuration) can.

use thiserror::Error;

/// Errors that can occur while configuring a transform run
#[derive(Error, Debug)]
pub enum CoreError {
    /// Mode name outside the supported set
    #[error("Unknown mode: {0} (expected one of: {1})")]
    UnknownMode(String, String),

    /// Error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing TOML configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for modedoc configuration
pub type Result<T> = std::result::Result<T, CoreError>;

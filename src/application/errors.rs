//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Forwarding was attempted but the post room is not resolved
    #[error("Misconfigured relay: {0}")]
    Misconfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by host platform calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by host: {0}")]
    Rejected(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

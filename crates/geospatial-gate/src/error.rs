//! Error types for geospatial-gate.
//!
//! Only persistence, configuration, and serialization paths return errors.
//! Bring-up and localization failures are surfaced as states, never as `Err`.

/// Error type covering every fallible library operation.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, GateError>;

//! Error types for iplookup
//!
//! Startup and backend failures share one error type. Request-level outcomes
//! (invalid input, not found, ...) are modelled separately in
//! [`crate::resolve::ErrorKind`] and never travel through this enum.

use thiserror::Error;

/// Main error type for iplookup
#[derive(Error, Debug)]
pub enum LookupError {
    /// Database file not found
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Database file exists but its contents are unusable
    #[error("Database corrupted: {0}")]
    DatabaseCorrupted(String),

    /// A store was bound to a family it cannot serve
    #[error("Unsupported address family: {0}")]
    UnsupportedFamily(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// MaxMind reader error
    #[error("MaxMind error: {0}")]
    MaxMindError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for iplookup
pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    /// Create a corrupted-database error
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        LookupError::DatabaseCorrupted(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LookupError::ConfigError(msg.into())
    }
}

impl From<maxminddb::MaxMindDBError> for LookupError {
    fn from(err: maxminddb::MaxMindDBError) -> Self {
        LookupError::MaxMindError(err.to_string())
    }
}

/// Convert from TryFromSliceError
impl From<std::array::TryFromSliceError> for LookupError {
    fn from(err: std::array::TryFromSliceError) -> Self {
        LookupError::DatabaseCorrupted(format!("Failed to convert byte slice: {}", err))
    }
}

//! Resolution output types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified location answer, independent of the backend that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Address exactly as the caller supplied it
    pub ip: String,
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub province: String,
    pub city: String,
    /// `0.0` when the backend has no coordinates; see `has_geocoding`
    pub latitude: f64,
    pub longitude: f64,
    pub isp: String,
    /// Whether `latitude`/`longitude` came from the backend
    pub has_geocoding: bool,

    // Only some backends carry these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Why a resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Empty or unparseable address, or the wrong family for the route
    InvalidInput,
    /// No store is configured for the address family
    Unsupported,
    /// The store has no record covering the address
    NotFound,
    /// The store failed to answer
    BackendUnavailable,
}

impl ErrorKind {
    /// Numeric code used in the response envelope
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 1,
            ErrorKind::BackendUnavailable => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Unsupported => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::NotFound => "not found",
            ErrorKind::BackendUnavailable => "backend unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Success(LocationInfo),
    Failure(ErrorKind, String),
}

impl ResolutionResult {
    pub fn failure<S: Into<String>>(kind: ErrorKind, detail: S) -> Self {
        ResolutionResult::Failure(kind, detail.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionResult::Success(_))
    }

    /// Failure kind, `None` on success
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ResolutionResult::Success(_) => None,
            ResolutionResult::Failure(kind, _) => Some(*kind),
        }
    }
}

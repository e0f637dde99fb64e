//! Type definitions for the database module
//!
//! Stores hand back one of two record shapes; neither is seen outside the
//! resolver, which reshapes them into a [`crate::resolve::LocationInfo`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-native record with named fields
///
/// Every field is optional: a store fills only what its medium provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredRecord {
    /// Address echoed by the backend. Never copied into a response.
    pub ip: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zip_code: Option<String>,
    pub timezone: Option<String>,
    pub domain: Option<String>,
    pub usage_type: Option<String>,
    pub asn: Option<String>,
    pub as_name: Option<String>,
    pub network: Option<String>,
}

/// Result of a successful store lookup
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// Fully typed record (IP2Location, MaxMind, SQLite)
    Structured(StructuredRecord),
    /// `country|region|province|city|isp` text (ip2region)
    Delimited(String),
}

/// Database type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// ip2region xdb file
    #[serde(alias = "xdb")]
    IP2Region,
    /// IP2Location BIN file
    #[serde(alias = "bin")]
    IP2Location,
    /// MaxMind GeoIP2 / GeoLite2 mmdb file
    #[serde(alias = "geoip", alias = "maxmind", alias = "mmdb")]
    GeoIP2,
    /// SQLite range table
    #[serde(alias = "sql")]
    Sqlite,
    /// Fixed record, for development and tests
    #[serde(alias = "static")]
    Stub,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::IP2Region => "ip2region",
            DatabaseType::IP2Location => "ip2location",
            DatabaseType::GeoIP2 => "geoip2",
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Stub => "stub",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! iplookup: IP geolocation lookup service
//!
//! Classifies an address, routes it to the location store configured for its
//! family (ip2region xdb, IP2Location BIN, MaxMind mmdb, SQLite) and returns
//! one uniform [`LocationInfo`](resolve::LocationInfo), over HTTP or from the
//! command line.

pub mod address;
pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod regex;
pub mod resolve;
pub mod utils;

// Re-export common types
pub use address::{classify, Address, AddressType, Family};
pub use config::AppConfig;
pub use database::{DatabaseType, LocationStore, RawRecord, Registry, StructuredRecord};
pub use error::{LookupError, Result};
pub use resolve::{ErrorKind, LocationInfo, ResolutionDispatcher, ResolutionResult};

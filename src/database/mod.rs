//! Database module for iplookup
//!
//! This module provides a unified interface over the supported location
//! databases. Each backend implements [`LocationStore`]; the [`Registry`]
//! binds one store per address family.
//!
//! # Module Organization
//!
//! - `types`: Record shapes and `DatabaseType`
//! - `traits`: The `LocationStore` trait
//! - `factory`: Builds stores from configuration
//! - `registry`: Family-to-store binding
//! - Store implementations: ip2region, ip2location, geoip2, sqlite, stub

// Core modules
pub mod factory;
pub mod registry;
pub mod traits;
pub mod types;

// Store implementation modules
pub mod common;
pub mod geoip2;
pub mod ip2location;
pub mod ip2region;
pub mod sqlite;
pub mod stub;

// Re-export core types and traits for convenience
pub use factory::DatabaseFactory;
pub use registry::Registry;
pub use traits::LocationStore;
pub use types::{DatabaseType, RawRecord, StructuredRecord};

// Re-export store implementations
pub use geoip2::GeoIP2Database;
pub use ip2location::IP2LocationDatabase;
pub use ip2region::IP2RegionDatabase;
pub use sqlite::SqliteDatabase;
pub use stub::StubDatabase;

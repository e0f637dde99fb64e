//! ip2region database implementation
//!
//! This module implements support for the ip2region `xdb` format, which maps
//! address ranges to a `country|region|province|city|isp` text blob.
//!
//! # Module Organization
//!
//! - `header`: xdb header and layout constants
//! - `database`: Core IP2RegionDatabase implementation

mod database;
mod header;

pub use database::IP2RegionDatabase;
pub use header::{IpVersion, XdbHeader};

#[cfg(test)]
pub(crate) use database::tests as fixtures;

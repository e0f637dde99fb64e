//! Trait definitions for the database module
//!
//! This module defines the common interface that all location stores must follow.

use crate::address::{Address, Family};
use crate::error::Result;

use super::types::{DatabaseType, RawRecord};

/// Common trait for all location stores
///
/// Stores are opened once at startup and only read afterwards, so `lookup`
/// takes `&self` and implementations must be safe to call from many threads
/// at once.
pub trait LocationStore: Send + Sync {
    fn name(&self) -> &str;
    fn database_type(&self) -> DatabaseType;
    fn supports_ipv4(&self) -> bool;
    fn supports_ipv6(&self) -> bool;

    /// Look up a validated address
    ///
    /// * `Ok(Some(record))` - the address is covered by the store
    /// * `Ok(None)` - the store confirms the address is absent
    /// * `Err(_)` - the underlying medium failed
    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>>;

    fn supports(&self, family: Family) -> bool {
        match family {
            Family::IPv4 => self.supports_ipv4(),
            Family::IPv6 => self.supports_ipv6(),
        }
    }
}

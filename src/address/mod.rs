//! Address classification
//!
//! Turns a caller-supplied string into an address family tag and, for valid
//! input, into an [`Address`] value that stores can be queried with.

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// Classification of a raw input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// IPv4 address (including IPv4-mapped IPv6 literals)
    IPv4,
    /// IPv6 address
    IPv6,
    /// Not an IP literal
    Invalid,
}

impl AddressType {
    /// Family of a valid classification
    pub fn family(self) -> Option<Family> {
        match self {
            AddressType::IPv4 => Some(Family::IPv4),
            AddressType::IPv6 => Some(Family::IPv6),
            AddressType::Invalid => None,
        }
    }
}

/// Address family a store is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    IPv4,
    IPv6,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::IPv4 => "ipv4",
            Family::IPv6 => "ipv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw string as IPv4, IPv6 or invalid.
///
/// An address is IPv4 when it has a 4-byte representation, which includes
/// IPv4-mapped IPv6 literals such as `::ffff:192.168.1.1`. It is IPv6 only
/// when it parses as 16 bytes and has no 4-byte form.
pub fn classify(raw: &str) -> AddressType {
    match raw.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => AddressType::IPv4,
        Ok(IpAddr::V6(v6)) if v6.to_ipv4_mapped().is_some() => AddressType::IPv4,
        Ok(IpAddr::V6(_)) => AddressType::IPv6,
        Err(_) => AddressType::Invalid,
    }
}

/// A validated address: the caller's original text plus its family.
///
/// Only constructed through [`Address::parse`], so an `Address` is never
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    raw: String,
    family: Family,
    ip: IpAddr,
}

impl Address {
    /// Classify and build an address in one step
    pub fn parse(raw: &str) -> Option<Self> {
        let ip = match raw.parse::<IpAddr>().ok()? {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => IpAddr::V6(v6),
            },
            v4 => v4,
        };
        let family = match ip {
            IpAddr::V4(_) => Family::IPv4,
            IpAddr::V6(_) => Family::IPv6,
        };
        Some(Self {
            raw: raw.to_string(),
            family,
            ip,
        })
    }

    /// Original text as supplied by the caller
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Parsed address; for mapped literals this is the embedded IPv4 address
    pub fn ip(&self) -> IpAddr {
        self.ip
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

//! Route an address to the store for its family

use crate::address::{self, Address, AddressType, Family};
use crate::database::Registry;

use super::normalizer::normalize;
use super::result::{ErrorKind, ResolutionResult};

/// Resolves raw address strings against a fixed registry.
///
/// Holds nothing but the registry, so one instance can be shared by every
/// request handler.
pub struct ResolutionDispatcher {
    registry: Registry,
}

impl ResolutionDispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve an address of any family
    pub fn resolve(&self, raw_ip: &str) -> ResolutionResult {
        self.dispatch(raw_ip, None)
    }

    /// Resolve an address that must belong to `expected`
    pub fn resolve_family(&self, raw_ip: &str, expected: Family) -> ResolutionResult {
        self.dispatch(raw_ip, Some(expected))
    }

    fn dispatch(&self, raw_ip: &str, expected: Option<Family>) -> ResolutionResult {
        let result = self.dispatch_inner(raw_ip, expected);
        match &result {
            ResolutionResult::Success(info) => {
                log::debug!("resolve {:?} -> {} {} {}", raw_ip, info.country, info.region, info.city)
            }
            ResolutionResult::Failure(kind, detail) => {
                log::debug!("resolve {:?} -> {}: {}", raw_ip, kind, detail)
            }
        }
        result
    }

    fn dispatch_inner(&self, raw_ip: &str, expected: Option<Family>) -> ResolutionResult {
        if raw_ip.is_empty() {
            return ResolutionResult::failure(ErrorKind::InvalidInput, "address required");
        }

        let family = match address::classify(raw_ip) {
            AddressType::Invalid => {
                return ResolutionResult::failure(ErrorKind::InvalidInput, "unparseable address");
            }
            AddressType::IPv4 => Family::IPv4,
            AddressType::IPv6 => Family::IPv6,
        };

        if let Some(expected) = expected.filter(|&expected| expected != family) {
            let detail = match expected {
                Family::IPv4 => "expected an IPv4 address",
                Family::IPv6 => "expected an IPv6 address",
            };
            return ResolutionResult::failure(ErrorKind::InvalidInput, detail);
        }

        let Some(store) = self.registry.get(family) else {
            return ResolutionResult::failure(
                ErrorKind::Unsupported,
                format!("no backend for family {}", family),
            );
        };

        let Some(address) = Address::parse(raw_ip) else {
            return ResolutionResult::failure(ErrorKind::InvalidInput, "unparseable address");
        };

        match store.lookup(&address) {
            Ok(Some(record)) => ResolutionResult::Success(normalize(record, raw_ip)),
            Ok(None) => ResolutionResult::failure(ErrorKind::NotFound, "no record for address"),
            Err(e) => {
                log::warn!("{} backend failed for {}: {}", store.name(), address, e);
                ResolutionResult::failure(ErrorKind::BackendUnavailable, e.to_string())
            }
        }
    }
}

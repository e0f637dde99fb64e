//! Family-to-store registry
//!
//! Built once at startup, read-only afterwards. Each family is served by at
//! most one store; a family without a store yields `Unsupported` at request
//! time.

use crate::address::Family;
use crate::config::DatabaseConfig;
use crate::error::{LookupError, Result};

use super::factory::DatabaseFactory;
use super::traits::LocationStore;

/// Stores keyed by address family
#[derive(Default)]
pub struct Registry {
    ipv4: Option<Box<dyn LocationStore>>,
    ipv6: Option<Box<dyn LocationStore>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every configured store
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let mut registry = Self::new();

        for (family, backend) in [(Family::IPv4, &config.ipv4), (Family::IPv6, &config.ipv6)] {
            match backend {
                Some(backend) => {
                    let store = DatabaseFactory::create(backend, &config.language)?;
                    registry.register(family, store)?;
                }
                None => log::warn!("No {} backend configured; {} lookups will be rejected", family, family),
            }
        }

        Ok(registry)
    }

    /// Bind a store to a family, replacing any previous binding
    pub fn register(&mut self, family: Family, store: Box<dyn LocationStore>) -> Result<()> {
        if !store.supports(family) {
            return Err(LookupError::UnsupportedFamily(format!(
                "{} backend cannot serve {} addresses",
                store.name(),
                family
            )));
        }

        log::info!("Registered {} backend for {}", store.name(), family);
        match family {
            Family::IPv4 => self.ipv4 = Some(store),
            Family::IPv6 => self.ipv6 = Some(store),
        }
        Ok(())
    }

    /// Builder form of [`Registry::register`]
    pub fn with(mut self, family: Family, store: Box<dyn LocationStore>) -> Result<Self> {
        self.register(family, store)?;
        Ok(self)
    }

    pub fn get(&self, family: Family) -> Option<&dyn LocationStore> {
        match family {
            Family::IPv4 => self.ipv4.as_deref(),
            Family::IPv6 => self.ipv6.as_deref(),
        }
    }

    /// Name of the store serving a family, if any
    pub fn backend_name(&self, family: Family) -> Option<&str> {
        self.get(family).map(|store| store.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::database::ip2region::fixtures::{sample_v4, write_temp};
    use crate::database::{DatabaseType, IP2RegionDatabase, StubDatabase};

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.get(Family::IPv4).is_none());
        assert!(registry.get(Family::IPv6).is_none());
    }

    #[test]
    fn test_register_and_get() {
        let registry = Registry::new()
            .with(Family::IPv6, Box::new(StubDatabase::default()))
            .unwrap();
        assert!(registry.get(Family::IPv4).is_none());
        assert_eq!(registry.backend_name(Family::IPv6), Some("stub"));
    }

    #[test]
    fn test_register_rejects_wrong_family() {
        let file = write_temp(&sample_v4());
        let store = IP2RegionDatabase::open(file.path()).unwrap();
        let err = Registry::new().register(Family::IPv6, Box::new(store)).unwrap_err();
        assert!(matches!(err, LookupError::UnsupportedFamily(_)));
    }

    #[test]
    fn test_from_config() {
        let file = write_temp(&sample_v4());
        let config = DatabaseConfig {
            language: "en".to_string(),
            ipv4: Some(BackendConfig::file(DatabaseType::IP2Region, file.path().to_string_lossy())),
            ipv6: None,
        };
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.backend_name(Family::IPv4), Some("ip2region"));
        assert!(registry.get(Family::IPv6).is_none());
    }

    #[test]
    fn test_from_config_propagates_open_errors() {
        let config = DatabaseConfig {
            language: "en".to_string(),
            ipv4: Some(BackendConfig::file(DatabaseType::IP2Region, "/nonexistent/ipv4.xdb")),
            ipv6: None,
        };
        assert!(Registry::from_config(&config).is_err());
    }
}

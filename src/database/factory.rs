//! Factory for creating location stores from configuration

use crate::config::BackendConfig;
use crate::error::Result;

use super::traits::LocationStore;
use super::types::DatabaseType;
use super::{GeoIP2Database, IP2LocationDatabase, IP2RegionDatabase, SqliteDatabase, StubDatabase};

/// Factory for creating location stores
pub struct DatabaseFactory;

impl DatabaseFactory {
    /// Open the store a backend entry describes
    ///
    /// `language` is only used by stores with localized names.
    pub fn create(config: &BackendConfig, language: &str) -> Result<Box<dyn LocationStore>> {
        let store: Box<dyn LocationStore> = match config.kind {
            DatabaseType::IP2Region => Box::new(IP2RegionDatabase::open(config.resolved_path()?)?),
            DatabaseType::IP2Location => Box::new(IP2LocationDatabase::open(config.resolved_path()?)?),
            DatabaseType::GeoIP2 => Box::new(GeoIP2Database::open(config.resolved_path()?, language)?),
            DatabaseType::Sqlite => Box::new(SqliteDatabase::open(config.resolved_path()?, &config.table)?),
            DatabaseType::Stub => {
                log::warn!("Using stub backend: every lookup returns the same fixed record");
                match (&config.text, &config.record) {
                    (Some(text), _) => Box::new(StubDatabase::delimited(text.clone())),
                    (None, Some(record)) => Box::new(StubDatabase::structured(record.clone())),
                    (None, None) => Box::new(StubDatabase::default()),
                }
            }
        };
        Ok(store)
    }
}

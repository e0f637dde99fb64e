//! GeoIP2 database implementation
//!
//! This module implements support for MaxMind GeoIP2 / GeoLite2 City databases
//! (`.mmdb`), with names localized to the configured language.

use crate::address::Address;
use crate::database::{DatabaseType, LocationStore, RawRecord, StructuredRecord};
use crate::error::{LookupError, Result};
use maxminddb::geoip2;
use std::collections::BTreeMap;
use std::path::Path;

const FALLBACK_LANGUAGE: &str = "en";

/// GeoIP2 database implementation
pub struct GeoIP2Database {
    name: String,
    language: String,
    reader: maxminddb::Reader<Vec<u8>>,
}

impl GeoIP2Database {
    /// Open an mmdb file; `language` selects localized names
    pub fn open<P: AsRef<Path>>(path: P, language: &str) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading GeoIP2 database from: {}", path.display());

        if !path.exists() {
            return Err(LookupError::DatabaseNotFound(path.display().to_string()));
        }

        let reader = maxminddb::Reader::open_readfile(path).map_err(|e| {
            LookupError::corrupted(format!("Failed to open GeoIP2 database {}: {}", path.display(), e))
        })?;

        log::info!(
            "Successfully loaded GeoIP2 database: {} (IPv{}, {} nodes)",
            reader.metadata.database_type,
            reader.metadata.ip_version,
            reader.metadata.node_count
        );

        Ok(Self {
            name: "geoip2".to_string(),
            language: language.to_string(),
            reader,
        })
    }

    fn localized(&self, names: Option<&BTreeMap<&str, &str>>) -> Option<String> {
        pick_name(names, &self.language)
    }

    fn to_record(&self, ip: &Address, city: geoip2::City<'_>) -> StructuredRecord {
        let country = city.country.as_ref();
        let location = city.location.as_ref();

        StructuredRecord {
            ip: Some(ip.ip().to_string()),
            country_code: country.and_then(|c| c.iso_code).map(str::to_string),
            country: self.localized(country.and_then(|c| c.names.as_ref())),
            region: self.localized(
                city.subdivisions
                    .as_ref()
                    .and_then(|subs| subs.first())
                    .and_then(|sub| sub.names.as_ref()),
            ),
            city: self.localized(city.city.as_ref().and_then(|c| c.names.as_ref())),
            latitude: location.and_then(|l| l.latitude),
            longitude: location.and_then(|l| l.longitude),
            timezone: location.and_then(|l| l.time_zone).map(str::to_string),
            zip_code: city.postal.as_ref().and_then(|p| p.code).map(str::to_string),
            ..StructuredRecord::default()
        }
    }
}

/// Name in `language`, else in English
fn pick_name(names: Option<&BTreeMap<&str, &str>>, language: &str) -> Option<String> {
    let names = names?;
    names
        .get(language)
        .or_else(|| names.get(FALLBACK_LANGUAGE))
        .map(|s| s.to_string())
}

impl LocationStore for GeoIP2Database {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::GeoIP2
    }

    fn supports_ipv4(&self) -> bool {
        true
    }

    fn supports_ipv6(&self) -> bool {
        self.reader.metadata.ip_version == 6
    }

    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>> {
        match self.reader.lookup::<geoip2::City>(address.ip()) {
            Ok(city) => {
                let record = self.to_record(address, city);
                log::debug!("geoip2 lookup {} -> {:?}", address, record.country);
                Ok(Some(RawRecord::Structured(record)))
            }
            Err(maxminddb::MaxMindDBError::AddressNotFoundError(_)) => {
                log::debug!("geoip2 lookup {} -> not found", address);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

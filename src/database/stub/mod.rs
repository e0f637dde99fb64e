//! Fixed-record store for development and tests

use crate::address::Address;
use crate::database::{DatabaseType, LocationStore, RawRecord, StructuredRecord};
use crate::error::Result;

/// Store that answers every lookup with the same record
pub struct StubDatabase {
    name: String,
    record: RawRecord,
}

impl StubDatabase {
    pub fn structured(record: StructuredRecord) -> Self {
        Self {
            name: "stub".to_string(),
            record: RawRecord::Structured(record),
        }
    }

    pub fn delimited<S: Into<String>>(text: S) -> Self {
        Self {
            name: "stub".to_string(),
            record: RawRecord::Delimited(text.into()),
        }
    }

    /// Placeholder record used when no record is configured
    pub fn demo_record() -> StructuredRecord {
        StructuredRecord {
            ip: Some("127.0.0.1".to_string()),
            country_code: Some("ZZ".to_string()),
            country: Some("Reserved".to_string()),
            region: Some("Local".to_string()),
            city: Some("Loopback".to_string()),
            isp: Some("Stub".to_string()),
            ..StructuredRecord::default()
        }
    }
}

impl Default for StubDatabase {
    fn default() -> Self {
        Self::structured(Self::demo_record())
    }
}

impl LocationStore for StubDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Stub
    }

    fn supports_ipv4(&self) -> bool {
        true
    }

    fn supports_ipv6(&self) -> bool {
        true
    }

    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>> {
        log::debug!("stub lookup {}", address);
        Ok(Some(self.record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_returns_record() {
        let store = StubDatabase::default();
        for ip in ["8.8.8.8", "2001:db8::1"] {
            let record = store.lookup(&Address::parse(ip).unwrap()).unwrap();
            assert!(matches!(record, Some(RawRecord::Structured(ref r)) if r.ip.as_deref() == Some("127.0.0.1")));
        }
    }

    #[test]
    fn test_delimited() {
        let store = StubDatabase::delimited("China|0|0|Beijing|0");
        let record = store.lookup(&Address::parse("1.2.3.4").unwrap()).unwrap();
        assert_eq!(record, Some(RawRecord::Delimited("China|0|0|Beijing|0".to_string())));
    }
}

//! SQLite range-table backend
//!
//! Ranges live in a single table keyed by `ip_from`/`ip_to` big-endian BLOBs
//! (4 bytes for IPv4, 16 for IPv6), so SQLite's bytewise BLOB ordering matches
//! numeric address ordering.
//!
//! ```sql
//! CREATE TABLE ip_locations (
//!     ip_from BLOB NOT NULL, ip_to BLOB NOT NULL,
//!     country_code TEXT, country TEXT, region TEXT, province TEXT, city TEXT,
//!     isp TEXT, latitude REAL, longitude REAL, zip_code TEXT, timezone TEXT,
//!     asn TEXT, as_name TEXT
//! );
//! ```

use crate::address::Address;
use crate::database::{DatabaseType, LocationStore, RawRecord, StructuredRecord};
use crate::error::{LookupError, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Default table name
pub const DEFAULT_TABLE: &str = "ip_locations";

/// SQLite-backed location store.
///
/// Holds only the path; every lookup opens its own read-only connection.
pub struct SqliteDatabase {
    name: String,
    path: PathBuf,
    query: String,
}

impl SqliteDatabase {
    /// Check the file and table, then build the store
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading SQLite database from: {} (table {})", path.display(), table);

        if !crate::regex::is_identifier(table) {
            return Err(LookupError::config(format!("invalid table name: {:?}", table)));
        }
        if !path.exists() {
            return Err(LookupError::DatabaseNotFound(path.display().to_string()));
        }

        let store = Self {
            name: "sqlite".to_string(),
            path: path.to_path_buf(),
            query: format!(
                "SELECT country_code, country, region, province, city, isp, latitude, longitude, \
                 zip_code, timezone, asn, as_name, ip_from, ip_to \
                 FROM {table} \
                 WHERE ip_from <= ?1 AND ip_to >= ?1 AND length(ip_from) = length(?1) \
                 ORDER BY ip_from DESC LIMIT 1"
            ),
        };

        // Preparing the query validates the table and its columns
        let conn = store.connect()?;
        conn.prepare(&store.query)?;
        let rows: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;

        log::info!("Successfully loaded SQLite database: {} ranges", rows);
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }

    fn row_to_record(row: &Row, ip: IpAddr) -> rusqlite::Result<StructuredRecord> {
        let ip_from: Vec<u8> = row.get(12)?;
        let ip_to: Vec<u8> = row.get(13)?;

        Ok(StructuredRecord {
            ip: Some(ip.to_string()),
            country_code: row.get(0)?,
            country: row.get(1)?,
            region: row.get(2)?,
            province: row.get(3)?,
            city: row.get(4)?,
            isp: row.get(5)?,
            latitude: row.get(6)?,
            longitude: row.get(7)?,
            zip_code: row.get(8)?,
            timezone: row.get(9)?,
            asn: row.get(10)?,
            as_name: row.get(11)?,
            network: range_label(&ip_from, &ip_to),
            ..StructuredRecord::default()
        })
    }
}

/// Big-endian key for an address
pub fn ip_key(ip: IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

fn key_to_ip(key: &[u8]) -> Option<IpAddr> {
    match key.len() {
        4 => <[u8; 4]>::try_from(key).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(key).ok().map(IpAddr::from),
        _ => None,
    }
}

/// `first-last` range text, or a CIDR when the range is a single block
fn range_label(from: &[u8], to: &[u8]) -> Option<String> {
    let first = key_to_ip(from)?;
    let last = key_to_ip(to)?;
    let bits = from.len() as u32 * 8;
    let span = to
        .iter()
        .zip(from)
        .fold(0u128, |acc, (t, f)| (acc << 8) | (t ^ f) as u128);
    let host_bits = 128 - span.leading_zeros();
    let aligned = span.count_ones() == host_bits && host_bits <= bits;
    if aligned {
        let net = ipnetwork::IpNetwork::new(first, (bits - host_bits) as u8).ok()?;
        if net.network() == first {
            return Some(net.to_string());
        }
    }
    Some(format!("{}-{}", first, last))
}

impl LocationStore for SqliteDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn supports_ipv4(&self) -> bool {
        true
    }

    fn supports_ipv6(&self) -> bool {
        true
    }

    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>> {
        let ip = address.ip();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&self.query)?;
        let record = stmt
            .query_row([ip_key(ip)], |row| Self::row_to_record(row, ip))
            .optional()?;

        log::debug!(
            "sqlite lookup {} -> {}",
            address,
            if record.is_some() { "hit" } else { "not found" }
        );
        Ok(record.map(RawRecord::Structured))
    }
}

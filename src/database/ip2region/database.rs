//! ip2region database implementation core

use crate::address::Address;
use crate::database::common::ByteReader;
use crate::database::{DatabaseType, LocationStore, RawRecord};
use crate::error::{LookupError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::net::IpAddr;
use std::path::Path;

use super::header::{HEADER_INFO_LENGTH, IpVersion, VECTOR_INDEX_COLS, VECTOR_INDEX_SIZE, XdbHeader};

/// ip2region xdb database
pub struct IP2RegionDatabase {
    name: String,
    mmap: Mmap,
    header: XdbHeader,
}

impl IP2RegionDatabase {
    /// Memory-map and validate an xdb file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading ip2region database from: {}", path.display());

        let file = File::open(path).map_err(|e| {
            LookupError::DatabaseNotFound(format!("{}: {}", path.display(), e))
        })?;

        let mmap = unsafe { Mmap::map(&file) }?;
        let header = XdbHeader::parse(&mmap)?;

        log::info!(
            "Successfully loaded ip2region database: version {}, {:?}, {} segments",
            header.version,
            header.ip_version,
            header.segment_count()
        );

        Ok(Self {
            name: "ip2region".to_string(),
            mmap,
            header,
        })
    }

    pub fn header(&self) -> &XdbHeader {
        &self.header
    }

    /// Find the region text for an address given in network byte order
    fn search(&self, ip: &[u8]) -> Result<Option<String>> {
        let reader = ByteReader::new(&self.mmap);
        let key = ip_to_u128(ip);

        let idx = ip[0] as usize * VECTOR_INDEX_COLS * VECTOR_INDEX_SIZE
            + ip[1] as usize * VECTOR_INDEX_SIZE;
        let s_ptr = reader.u32_at(HEADER_INFO_LENGTH + idx)? as usize;
        let e_ptr = reader.u32_at(HEADER_INFO_LENGTH + idx + 4)? as usize;

        if s_ptr == 0 && e_ptr == 0 {
            return Ok(None);
        }
        if e_ptr < s_ptr {
            return Err(LookupError::corrupted(format!(
                "vector index cell {} has end pointer before start",
                idx / VECTOR_INDEX_SIZE
            )));
        }

        let seg_size = self.header.segment_index_size();
        let ip_len = self.header.ip_version.ip_len();
        let mut low = 0usize;
        let mut high = (e_ptr - s_ptr) / seg_size;

        while low <= high {
            let mid = (low + high) >> 1;
            let p = s_ptr + mid * seg_size;

            let start_ip = self.segment_ip(&reader, p)?;
            if key < start_ip {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
                continue;
            }

            let end_ip = self.segment_ip(&reader, p + ip_len)?;
            if key > end_ip {
                low = mid + 1;
                continue;
            }

            let data_len = reader.u16_at(p + ip_len * 2)? as usize;
            let data_ptr = reader.u32_at(p + ip_len * 2 + 2)? as usize;
            if data_len == 0 {
                return Ok(None);
            }
            let bytes = reader.slice(data_ptr, data_len)?;
            return Ok(Some(String::from_utf8_lossy(bytes).into_owned()));
        }

        Ok(None)
    }

    /// IPv4 segments store little-endian u32s; IPv6 segments store raw
    /// network-order bytes.
    fn segment_ip(&self, reader: &ByteReader<'_>, offset: usize) -> Result<u128> {
        match self.header.ip_version {
            IpVersion::V4 => Ok(reader.u32_at(offset)? as u128),
            IpVersion::V6 => Ok(u128::from_be_bytes(reader.slice(offset, 16)?.try_into()?)),
        }
    }
}

fn ip_to_u128(ip: &[u8]) -> u128 {
    ip.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128)
}

impl LocationStore for IP2RegionDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::IP2Region
    }

    fn supports_ipv4(&self) -> bool {
        self.header.ip_version == IpVersion::V4
    }

    fn supports_ipv6(&self) -> bool {
        self.header.ip_version == IpVersion::V6
    }

    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>> {
        let region = match (address.ip(), self.header.ip_version) {
            (IpAddr::V4(v4), IpVersion::V4) => self.search(&v4.octets())?,
            (IpAddr::V6(v6), IpVersion::V6) => self.search(&v6.octets())?,
            _ => {
                return Err(LookupError::UnsupportedFamily(format!(
                    "{} database cannot serve {}",
                    self.name,
                    address.family()
                )));
            }
        };

        log::debug!("ip2region lookup {} -> {:?}", address, region);
        Ok(region.map(RawRecord::Delimited))
    }
}

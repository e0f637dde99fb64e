//! IP2Location database implementation core

use crate::address::Address;
use crate::database::common::ByteReader;
use crate::database::{DatabaseType, LocationStore, RawRecord, StructuredRecord};
use crate::error::{LookupError, Result};
use ipnetwork::IpNetwork;
use memmap2::Mmap;
use std::fs::File;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use super::columns::ColumnLayout;
use super::header::BinHeader;

/// A matched row: byte offset of the row and the inclusive address range it covers
struct Row {
    offset: usize,
    first: u128,
    last: u128,
}

/// Per-family view of the BIN file
struct Section {
    count: u32,
    base: u32,
    index_base: u32,
    ip_len: usize,
    col_size: usize,
    /// Bits to shift an address right to get its 16-bit index key
    index_shift: u32,
    max_ip: u128,
}

/// IP2Location BIN database
pub struct IP2LocationDatabase {
    name: String,
    mmap: Mmap,
    header: BinHeader,
    layout: ColumnLayout,
}

impl IP2LocationDatabase {
    /// Memory-map and validate a BIN file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading IP2Location database from: {}", path.display());

        let file = File::open(path).map_err(|e| {
            LookupError::DatabaseNotFound(format!("{}: {}", path.display(), e))
        })?;

        let mmap = unsafe { Mmap::map(&file) }?;
        let header = BinHeader::parse(&mmap)?;

        let layout = ColumnLayout::for_type(header.db_type).ok_or_else(|| {
            LookupError::corrupted(format!("unknown database type {}", header.db_type))
        })?;
        if layout.max_position() > header.db_column {
            return Err(LookupError::corrupted(format!(
                "DB{} needs {} columns, file declares {}",
                header.db_type,
                layout.max_position(),
                header.db_column
            )));
        }

        log::info!(
            "Successfully loaded IP2Location DB{} ({}): {} IPv4 rows, {} IPv6 rows",
            header.db_type,
            header.release_date(),
            header.ipv4_count,
            header.ipv6_count
        );

        Ok(Self {
            name: "ip2location".to_string(),
            mmap,
            header,
            layout,
        })
    }

    fn section(&self, ip: IpAddr) -> Section {
        match ip {
            IpAddr::V4(_) => Section {
                count: self.header.ipv4_count,
                base: self.header.ipv4_base,
                index_base: self.header.ipv4_index_base,
                ip_len: 4,
                col_size: self.header.ipv4_column_size(),
                index_shift: 16,
                max_ip: u32::MAX as u128,
            },
            IpAddr::V6(_) => Section {
                count: self.header.ipv6_count,
                base: self.header.ipv6_base,
                index_base: self.header.ipv6_index_base,
                ip_len: 16,
                col_size: self.header.ipv6_column_size(),
                index_shift: 112,
                max_ip: u128::MAX,
            },
        }
    }

    /// Binary search the rows of one section
    fn find_row(&self, reader: &ByteReader<'_>, section: &Section, ip: u128) -> Result<Option<Row>> {
        if section.count == 0 {
            return Ok(None);
        }

        // The top address is stored as the end of the last range
        let ipno = if ip == section.max_ip { ip - 1 } else { ip };

        let mut low = 0usize;
        let mut high = section.count as usize;
        if section.index_base > 0 {
            let pos = (((ipno >> section.index_shift) as usize) << 3) + section.index_base as usize;
            low = reader.u32_at(pos - 1)? as usize;
            high = reader.u32_at(pos + 3)? as usize;
        }
        // Row `count` is the terminator; only its start address is meaningful
        high = high.min(section.count as usize - 1);

        let row_start = section.base as usize - 1;
        while low <= high {
            let mid = (low + high) / 2;
            let offset = row_start + mid * section.col_size;
            let ip_from = read_ip(reader, offset, section.ip_len)?;
            let ip_to = read_ip(reader, offset + section.col_size, section.ip_len)?;

            if ipno >= ip_from && ipno < ip_to {
                return Ok(Some(Row {
                    offset,
                    first: ip_from,
                    last: ip_to - 1,
                }));
            }
            if ipno < ip_from {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }

        Ok(None)
    }

    fn decode_row(&self, reader: &ByteReader<'_>, row: &Row, ip_len: usize, ip: IpAddr) -> Result<StructuredRecord> {
        let field = |position: u8| row.offset + ip_len + (position as usize - 2) * 4;
        let text = |position: u8| -> Result<Option<String>> {
            if position == 0 {
                return Ok(None);
            }
            let ptr = reader.u32_at(field(position))? as usize;
            Ok(present(reader.pascal_string(ptr)?))
        };
        let float = |position: u8| -> Result<Option<f64>> {
            if position == 0 {
                return Ok(None);
            }
            Ok(Some(reader.f32_at(field(position))? as f64))
        };

        let (country_code, country) = if self.layout.country > 0 {
            let ptr = reader.u32_at(field(self.layout.country))? as usize;
            (
                present(reader.pascal_string(ptr)?),
                present(reader.pascal_string(ptr + 3)?),
            )
        } else {
            (None, None)
        };

        Ok(StructuredRecord {
            ip: Some(ip.to_string()),
            country_code,
            country,
            region: text(self.layout.region)?,
            province: None,
            city: text(self.layout.city)?,
            isp: text(self.layout.isp)?,
            latitude: float(self.layout.latitude)?,
            longitude: float(self.layout.longitude)?,
            zip_code: text(self.layout.zip_code)?,
            timezone: text(self.layout.timezone)?,
            domain: text(self.layout.domain)?,
            usage_type: text(self.layout.usage_type)?,
            asn: text(self.layout.asn)?,
            as_name: text(self.layout.as_name)?,
            network: covering_network(ip, row.first, row.last).map(|n| n.to_string()),
        })
    }
}

fn read_ip(reader: &ByteReader<'_>, offset: usize, ip_len: usize) -> Result<u128> {
    if ip_len == 4 {
        Ok(reader.u32_at(offset)? as u128)
    } else {
        reader.u128_at(offset)
    }
}

fn ip_to_u128(ip: IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Lite editions fill columns they do not carry with this notice
const UNAVAILABLE_NOTICE: &str = "This parameter is unavailable";

/// `-` marks an unknown value in BIN files
fn present(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "-" || value.starts_with(UNAVAILABLE_NOTICE) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Largest CIDR block that contains `ip` and lies inside `[first, last]`
fn covering_network(ip: IpAddr, first: u128, last: u128) -> Option<IpNetwork> {
    let bits: u32 = if ip.is_ipv4() { 32 } else { 128 };
    let value = ip_to_u128(ip);

    for prefix in 0..=bits {
        let host_bits = bits - prefix;
        let span = if host_bits == 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        let start = value & !span;
        let end = start | span;
        if start >= first && end <= last {
            let addr = if ip.is_ipv4() {
                IpAddr::V4(Ipv4Addr::from(start as u32))
            } else {
                IpAddr::V6(Ipv6Addr::from(start))
            };
            return IpNetwork::new(addr, prefix as u8).ok();
        }
    }
    None
}

impl LocationStore for IP2LocationDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::IP2Location
    }

    fn supports_ipv4(&self) -> bool {
        self.header.ipv4_count > 0
    }

    fn supports_ipv6(&self) -> bool {
        self.header.ipv6_count > 0
    }

    fn lookup(&self, address: &Address) -> Result<Option<RawRecord>> {
        let ip = address.ip();
        let section = self.section(ip);
        let reader = ByteReader::new(&self.mmap);

        let row = match self.find_row(&reader, &section, ip_to_u128(ip))? {
            Some(row) => row,
            None => {
                log::debug!("ip2location lookup {} -> not found", address);
                return Ok(None);
            }
        };

        let record = self.decode_row(&reader, &row, section.ip_len, ip)?;
        if record.country_code.is_none() && record.country.is_none() {
            // Unallocated ranges are stored as rows of "-"
            log::debug!("ip2location lookup {} -> unallocated range", address);
            return Ok(None);
        }

        log::debug!("ip2location lookup {} -> {:?}", address, record.country);
        Ok(Some(RawRecord::Structured(record)))
    }
}

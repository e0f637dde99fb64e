//! xdb header structure and layout constants
//!
//! ```text
//! +----------------+---------------------------+----------------+---------------+
//! | header (256 B) | vector index (256*256*8)  | region data    | segment index |
//! +----------------+---------------------------+----------------+---------------+
//! ```

use crate::error::{LookupError, Result};
use crate::database::common::ByteReader;

pub const HEADER_INFO_LENGTH: usize = 256;
pub const VECTOR_INDEX_ROWS: usize = 256;
pub const VECTOR_INDEX_COLS: usize = 256;
pub const VECTOR_INDEX_SIZE: usize = 8;
pub const VECTOR_INDEX_LENGTH: usize = VECTOR_INDEX_ROWS * VECTOR_INDEX_COLS * VECTOR_INDEX_SIZE;

/// Address family stored in an xdb file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Length in bytes of one address in the segment index
    pub fn ip_len(self) -> usize {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 16,
        }
    }
}

/// xdb header
#[derive(Debug, Clone)]
pub struct XdbHeader {
    pub version: u16,
    pub index_policy: u16,
    pub created_at: u32,
    pub start_index_ptr: u32,
    pub end_index_ptr: u32,
    pub ip_version: IpVersion,
}

impl XdbHeader {
    /// Parse header from raw data
    ///
    /// Version 2 files carry IPv4 data only. Version 3 files record the
    /// address family at offset 16.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_INFO_LENGTH + VECTOR_INDEX_LENGTH {
            return Err(LookupError::corrupted("Invalid xdb database: file too small"));
        }

        let reader = ByteReader::new(data);
        let version = reader.u16_at(0)?;
        let index_policy = reader.u16_at(2)?;
        let created_at = reader.u32_at(4)?;
        let start_index_ptr = reader.u32_at(8)?;
        let end_index_ptr = reader.u32_at(12)?;

        let ip_version = if version >= 3 {
            match reader.u16_at(16)? {
                4 => IpVersion::V4,
                6 => IpVersion::V6,
                other => {
                    return Err(LookupError::corrupted(format!(
                        "Invalid xdb database: unknown ip version {}",
                        other
                    )));
                }
            }
        } else {
            IpVersion::V4
        };

        let header = Self {
            version,
            index_policy,
            created_at,
            start_index_ptr,
            end_index_ptr,
            ip_version,
        };
        header.validate(data.len())?;
        Ok(header)
    }

    /// Size of one segment index entry: start ip, end ip, data length, data pointer
    pub fn segment_index_size(&self) -> usize {
        self.ip_version.ip_len() * 2 + 2 + 4
    }

    fn validate(&self, file_len: usize) -> Result<()> {
        let start = self.start_index_ptr as usize;
        let end = self.end_index_ptr as usize;
        let size = self.segment_index_size();

        if start < HEADER_INFO_LENGTH + VECTOR_INDEX_LENGTH
            || start > end
            || end + size > file_len
            || (end - start) % size != 0
        {
            return Err(LookupError::corrupted(format!(
                "Invalid xdb database: segment index [{}, {}] does not fit file of {} bytes",
                start, end, file_len
            )));
        }
        Ok(())
    }

    /// Number of segments in the index
    pub fn segment_count(&self) -> usize {
        (self.end_index_ptr - self.start_index_ptr) as usize / self.segment_index_size() + 1
    }
}

//! BIN header structure
//!
//! All base addresses in the header are 1-based file offsets.

use crate::database::common::ByteReader;
use crate::error::{LookupError, Result};

/// Minimum bytes needed to read the header fields we use
pub const HEADER_LENGTH: usize = 32;

/// IP2Location BIN header
#[derive(Debug, Clone)]
pub struct BinHeader {
    pub db_type: u8,
    pub db_column: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub ipv4_count: u32,
    pub ipv4_base: u32,
    pub ipv6_count: u32,
    pub ipv6_base: u32,
    pub ipv4_index_base: u32,
    pub ipv6_index_base: u32,
}

impl BinHeader {
    /// Parse header from raw data
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LENGTH {
            return Err(LookupError::corrupted("Invalid BIN database: file too small"));
        }

        let reader = ByteReader::new(data);
        let header = Self {
            db_type: reader.u8_at(0)?,
            db_column: reader.u8_at(1)?,
            year: reader.u8_at(2)?,
            month: reader.u8_at(3)?,
            day: reader.u8_at(4)?,
            ipv4_count: reader.u32_at(5)?,
            ipv4_base: reader.u32_at(9)?,
            ipv6_count: reader.u32_at(13)?,
            ipv6_base: reader.u32_at(17)?,
            ipv4_index_base: reader.u32_at(21)?,
            ipv6_index_base: reader.u32_at(25)?,
        };
        header.validate(data.len())?;
        Ok(header)
    }

    /// Row width of the IPv4 section
    pub fn ipv4_column_size(&self) -> usize {
        self.db_column as usize * 4
    }

    /// Row width of the IPv6 section: 16-byte start address plus 4-byte columns
    pub fn ipv6_column_size(&self) -> usize {
        16 + (self.db_column as usize - 1) * 4
    }

    fn validate(&self, file_len: usize) -> Result<()> {
        if self.db_type == 0 || self.db_type > 26 {
            return Err(LookupError::corrupted(format!(
                "Invalid BIN database: unknown database type {}",
                self.db_type
            )));
        }
        if self.db_column < 2 {
            return Err(LookupError::corrupted(format!(
                "Invalid BIN database: column count {}",
                self.db_column
            )));
        }

        // Each section holds `count` rows plus one terminating row
        let sections = [
            ("IPv4", self.ipv4_count, self.ipv4_base, self.ipv4_column_size()),
            ("IPv6", self.ipv6_count, self.ipv6_base, self.ipv6_column_size()),
        ];
        for (label, count, base, col_size) in sections {
            if count == 0 {
                continue;
            }
            let end = (base as usize)
                .checked_sub(1)
                .map(|start| start + (count as usize + 1) * col_size);
            if end.is_none_or(|end| end > file_len) {
                return Err(LookupError::corrupted(format!(
                    "Invalid BIN database: {} section ({} rows at {}) exceeds file of {} bytes",
                    label, count, base, file_len
                )));
            }
        }

        Ok(())
    }

    /// Release date as `20YY-MM-DD`
    pub fn release_date(&self) -> String {
        format!("20{:02}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

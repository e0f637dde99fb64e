//! Bounds-checked little-endian reads over a byte slice

use crate::error::{LookupError, Result};

/// Reader for parsing memory-mapped database files
#[derive(Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                LookupError::DatabaseCorrupted(format!(
                    "Index out of bounds: offset={}, len={}, size={}",
                    offset,
                    len,
                    self.data.len()
                ))
            })
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_le_bytes(self.slice(offset, 2)?.try_into()?))
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_le_bytes(self.slice(offset, 4)?.try_into()?))
    }

    pub fn u128_at(&self, offset: usize) -> Result<u128> {
        Ok(u128::from_le_bytes(self.slice(offset, 16)?.try_into()?))
    }

    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        Ok(f32::from_le_bytes(self.slice(offset, 4)?.try_into()?))
    }

    /// Read a string prefixed by a single length byte
    pub fn pascal_string(&self, offset: usize) -> Result<String> {
        let len = self.u8_at(offset)? as usize;
        let bytes = self.slice(offset + 1, len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

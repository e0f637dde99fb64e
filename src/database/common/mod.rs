//! Helpers shared by the binary file stores
//!
//! The xdb and BIN formats are both little-endian files addressed by raw
//! offsets. Every read goes through [`ByteReader`]; an out-of-range read is a
//! `DatabaseCorrupted` error.

mod reader;

pub use reader::ByteReader;

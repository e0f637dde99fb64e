//! IP2Location database implementation
//!
//! This module implements support for the IP2Location `BIN` format. Each row
//! holds the first address of a range followed by fixed-width columns; which
//! column carries which field depends on the database product type (DB1 to
//! DB26).
//!
//! # Module Organization
//!
//! - `header`: BIN header
//! - `columns`: Column positions per database type
//! - `database`: Core IP2LocationDatabase implementation

mod columns;
mod database;
mod header;

pub use columns::ColumnLayout;
pub use database::IP2LocationDatabase;
pub use header::BinHeader;

//! Utility helpers

pub mod path;

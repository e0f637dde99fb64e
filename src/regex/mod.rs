//! Regular expressions used to validate configuration values

use once_cell::sync::Lazy;
use regex::Regex;

/// SQL identifier, safe to splice into a query as a table name
pub static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to compile identifier regex")
});

/// Route prefix such as `/api/v1`: one or more `/segment` parts, no trailing slash
pub static API_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:/[A-Za-z0-9._~-]+)+$").expect("Failed to compile API prefix regex")
});

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER_RE.is_match(text)
}

pub fn is_api_prefix(text: &str) -> bool {
    API_PREFIX_RE.is_match(text)
}

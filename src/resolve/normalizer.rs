//! Reshape store records into [`LocationInfo`]

use crate::database::{RawRecord, StructuredRecord};

use super::result::LocationInfo;

const DELIMITER: char = '|';

/// ip2region writes `0` for an unknown segment
const UNKNOWN_SEGMENT: &str = "0";

/// Number of positional fields in delimited text
const DELIMITED_FIELDS: usize = 5;

/// Turn a store record into the unified shape.
///
/// `ip` in the output is always `original_ip`; whatever address the store
/// echoes is ignored.
pub fn normalize(record: RawRecord, original_ip: &str) -> LocationInfo {
    match record {
        RawRecord::Structured(record) => from_structured(record, original_ip),
        RawRecord::Delimited(text) => from_delimited(&text, original_ip),
    }
}

fn from_structured(record: StructuredRecord, original_ip: &str) -> LocationInfo {
    let has_geocoding = record.latitude.is_some() && record.longitude.is_some();
    let country = record
        .country
        .or_else(|| record.country_code.clone())
        .unwrap_or_default();

    LocationInfo {
        ip: original_ip.to_string(),
        country,
        country_code: record.country_code.unwrap_or_default(),
        region: record.region.unwrap_or_default(),
        province: record.province.unwrap_or_default(),
        city: record.city.unwrap_or_default(),
        latitude: record.latitude.unwrap_or(0.0),
        longitude: record.longitude.unwrap_or(0.0),
        isp: record.isp.unwrap_or_default(),
        has_geocoding,
        asn: record.asn,
        as_name: record.as_name,
        zip_code: record.zip_code,
        timezone: record.timezone,
        domain: record.domain,
        usage_type: record.usage_type,
        network: record.network,
    }
}

fn from_delimited(text: &str, original_ip: &str) -> LocationInfo {
    let [country, region, province, city, isp] = parse_delimited(text);
    LocationInfo {
        ip: original_ip.to_string(),
        country,
        region,
        province,
        city,
        isp,
        ..LocationInfo::default()
    }
}

/// Split `country|region|province|city|isp` into its five fields.
///
/// Missing trailing fields are empty. Text after a fifth delimiter is kept
/// in `isp` with the extra delimiters and `0` placeholders removed.
pub fn parse_delimited(text: &str) -> [String; DELIMITED_FIELDS] {
    let mut fields: [String; DELIMITED_FIELDS] = Default::default();

    for (field, segment) in fields.iter_mut().zip(text.splitn(DELIMITED_FIELDS, DELIMITER)) {
        // The last field may still hold folded segments; drop placeholders in each
        *field = segment
            .split(DELIMITER)
            .filter(|part| *part != UNKNOWN_SEGMENT)
            .collect();
    }

    fields
}

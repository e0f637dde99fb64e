//! Column positions per database type
//!
//! Position 1 is the range start address. A position of 0 means the database
//! type does not carry that field.

const COUNTRY: [u8; 27] = [0, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2];
const REGION: [u8; 27] = [0, 0, 0, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3];
const CITY: [u8; 27] = [0, 0, 0, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4];
const ISP: [u8; 27] = [0, 0, 3, 0, 5, 0, 7, 5, 7, 0, 8, 0, 9, 0, 9, 0, 9, 0, 9, 7, 9, 0, 9, 7, 9, 9, 9];
const LATITUDE: [u8; 27] = [0, 0, 0, 0, 0, 5, 5, 0, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5];
const LONGITUDE: [u8; 27] = [0, 0, 0, 0, 0, 6, 6, 0, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6];
const DOMAIN: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 6, 8, 0, 9, 0, 10, 0, 10, 0, 10, 0, 10, 8, 10, 0, 10, 8, 10, 10, 10];
const ZIP_CODE: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 7, 7, 7, 7, 0, 7, 7, 7, 0, 7, 0, 7, 7, 7, 0, 7, 7, 7];
const TIMEZONE: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 8, 8, 7, 8, 8, 8, 7, 8, 0, 8, 8, 8, 0, 8, 8, 8];
const USAGE_TYPE: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 12, 20, 20, 20];
const ASN: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 24];
const AS_NAME: [u8; 27] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 25];

/// Where each supported field lives in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub country: u8,
    pub region: u8,
    pub city: u8,
    pub isp: u8,
    pub latitude: u8,
    pub longitude: u8,
    pub domain: u8,
    pub zip_code: u8,
    pub timezone: u8,
    pub usage_type: u8,
    pub asn: u8,
    pub as_name: u8,
}

impl ColumnLayout {
    /// Layout for a database type, `None` for unknown types
    pub fn for_type(db_type: u8) -> Option<Self> {
        let t = db_type as usize;
        if t == 0 || t >= COUNTRY.len() {
            return None;
        }
        Some(Self {
            country: COUNTRY[t],
            region: REGION[t],
            city: CITY[t],
            isp: ISP[t],
            latitude: LATITUDE[t],
            longitude: LONGITUDE[t],
            domain: DOMAIN[t],
            zip_code: ZIP_CODE[t],
            timezone: TIMEZONE[t],
            usage_type: USAGE_TYPE[t],
            asn: ASN[t],
            as_name: AS_NAME[t],
        })
    }

    /// Highest position referenced by this layout
    pub fn max_position(&self) -> u8 {
        [
            self.country,
            self.region,
            self.city,
            self.isp,
            self.latitude,
            self.longitude,
            self.domain,
            self.zip_code,
            self.timezone,
            self.usage_type,
            self.asn,
            self.as_name,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

//! GeoIP resolution: maps a client IP to an ISO-3166-1 alpha-2 country code.
//!
//! The GeoIP database reader itself is out of scope for this crate (spec
//! §1); only the lookup contract (`GeoIp`) and a MaxMind-backed
//! implementation are provided, in the same trait-plus-ready-made-backend
//! shape as `GeoLoader`.

use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AdmissionError, Result};

/// Country-code lookup contract consumed by the country matcher (spec §4.1,
/// §6.2). A miss (unknown IP, unopened database, lookup error) must return
/// `None` -- it is never an error, since the evaluator treats "unknown
/// country" as matching no configured code (spec §4.6, §7).
pub trait GeoIp: Send + Sync {
    /// Resolve `ip` to an uppercase two-letter country code, if known.
    fn country(&self, ip: IpAddr) -> Option<String>;
}

#[derive(Deserialize)]
struct CountryRecord {
    country: Option<CountryInfo>,
}

#[derive(Deserialize)]
struct CountryInfo {
    iso_code: Option<String>,
}

/// MaxMind MMDB-backed GeoIP resolver (GeoLite2-Country or GeoIP2-Country
/// databases).
pub struct MaxMindGeoIp {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl MaxMindGeoIp {
    /// Open an MMDB file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = maxminddb::Reader::open_readfile(path.as_ref())
            .map_err(|e| AdmissionError::GeoIp(format!("failed to open MMDB file: {}", e)))?;
        Ok(Self { reader })
    }
}

impl GeoIp for MaxMindGeoIp {
    fn country(&self, ip: IpAddr) -> Option<String> {
        self.reader
            .lookup::<CountryRecord>(ip)
            .ok()
            .flatten()
            .and_then(|record| record.country)
            .and_then(|c| c.iso_code)
            .map(|code| code.to_uppercase())
    }
}

/// A resolver that never resolves anything -- every lookup is a miss. Used
/// where no GeoIP database is configured; per spec §4.1/§7, geo-country
/// checks then simply never match (authorized-country lists reject
/// everything, blacklist-country lists admit everything).
#[derive(Debug, Clone, Copy, Default)]
pub struct NilGeoIp;

impl GeoIp for NilGeoIp {
    fn country(&self, _ip: IpAddr) -> Option<String> {
        None
    }
}

/// An in-memory GeoIP resolver for tests, mapping specific IPs to country
/// codes without touching disk.
#[derive(Debug, Clone, Default)]
pub struct StaticGeoIp {
    entries: std::collections::HashMap<IpAddr, String>,
}

impl StaticGeoIp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ip: IpAddr, country: impl Into<String>) -> Self {
        self.entries.insert(ip, country.into().to_uppercase());
        self
    }
}

impl GeoIp for StaticGeoIp {
    fn country(&self, ip: IpAddr) -> Option<String> {
        self.entries.get(&ip).cloned()
    }
}

use std::collections::HashSet;
use std::net::IpAddr;

use crate::geoip::GeoIp;

/// Country-code set membership, resolved through a `GeoIp` lookup (spec
/// §4.1). Adapted from `src/matcher/geoip.rs`'s `GeoIpMatcher`, which owned
/// a `maxminddb::Reader` directly; here the matcher is generic over the
/// crate's own `GeoIp` trait so tests can swap in
/// `StaticGeoIp`/`NilGeoIp` without touching disk.
#[derive(Debug, Clone, Default)]
pub struct CountrySetMatcher {
    codes: HashSet<String>,
}

impl CountrySetMatcher {
    pub fn new(codes: HashSet<String>) -> Self {
        Self { codes }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// True iff `geoip` resolves `ip` to a country present in the set. A
    /// GeoIP miss resolves to "unknown", which never matches (spec §4.1,
    /// §7).
    pub fn matches(&self, geoip: &dyn GeoIp, ip: IpAddr) -> bool {
        match geoip.country(ip) {
            Some(code) => self.codes.contains(&code),
            None => false,
        }
    }

    pub fn merged_with(mut self, other: Self) -> Self {
        self.codes.extend(other.codes);
        self
    }

    pub fn codes(&self) -> &HashSet<String> {
        &self.codes
    }
}

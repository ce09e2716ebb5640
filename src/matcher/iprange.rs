use std::net::IpAddr;

use ipnet::IpNet;

/// A single address-family CIDR list sorted by network address, with a
/// precomputed prefix-max broadcast array for efficient early termination.
///
/// Adapted from `src/matcher/geoip.rs`'s `SortedCidrList`/`SortedCidrs`,
/// generalized from per-country GeoIP lookup to the
/// `authorized_iprange`/`blacklist_iprange` fields.
#[derive(Debug, Clone, Default)]
struct SortedCidrList {
    cidrs: Vec<IpNet>,
    max_broadcast: Vec<IpAddr>,
}

impl SortedCidrList {
    fn from_cidrs(mut cidrs: Vec<IpNet>) -> Self {
        cidrs.sort_by_key(|c| c.network());
        let mut max_broadcast = Vec::with_capacity(cidrs.len());
        let mut current_max: Option<IpAddr> = None;
        for cidr in &cidrs {
            let bcast = cidr.broadcast();
            current_max = Some(match current_max {
                Some(m) if bcast > m => bcast,
                Some(m) => m,
                None => bcast,
            });
            max_broadcast.push(current_max.unwrap());
        }
        Self {
            cidrs,
            max_broadcast,
        }
    }

    fn contains(&self, ip: IpAddr) -> bool {
        if self.cidrs.is_empty() {
            return false;
        }
        let idx = self.cidrs.partition_point(|c| c.network() <= ip);
        for i in (0..idx).rev() {
            if self.cidrs[i].contains(&ip) {
                return true;
            }
            if self.max_broadcast[i] < ip {
                break;
            }
        }
        false
    }
}

/// Parse one `authorized_iprange`/`blacklist_iprange` entry. A bare address
/// is a host route (/32 or /128); a CIDR block is used as-is. Returns
/// `None` for anything else (spec §3 invariant (b): malformed entries are
/// ignored, not a parse error).
fn parse_entry(entry: &str) -> Option<IpNet> {
    if let Ok(net) = entry.parse::<IpNet>() {
        return Some(net);
    }
    if let Ok(addr) = entry.parse::<IpAddr>() {
        return IpNet::new(addr, if addr.is_ipv4() { 32 } else { 128 }).ok();
    }
    None
}

/// Matches a client IP against a list of configured bare-address/CIDR
/// entries. Entries that fail to parse are silently dropped from the
/// matchable set -- the document still loads, and the entry simply never
/// matches anything (spec §3, §4.1, §9 Open Question -- resolved in favor
/// of the source's original lenient behavior). A malformed entry is still
/// a *configured* entry, though: `is_empty()` tracks whether the field was
/// configured at all, separately from how many entries parsed -- a field
/// configured with only malformed entries still denies non-matching IPs
/// rather than falling through as "unconstrained" (the category is
/// enforced, it just never admits).
#[derive(Debug, Clone, Default)]
pub struct IpRangeMatcher {
    raw: Vec<IpNet>,
    configured_count: usize,
    v4: SortedCidrList,
    v6: SortedCidrList,
}

impl IpRangeMatcher {
    pub fn new(entries: &[String]) -> Self {
        let nets: Vec<IpNet> = entries.iter().filter_map(|e| parse_entry(e)).collect();
        Self::from_nets(nets, entries.len())
    }

    fn from_nets(nets: Vec<IpNet>, configured_count: usize) -> Self {
        let mut v4 = Vec::new();
        let mut v6 = Vec::new();
        for net in &nets {
            match net {
                IpNet::V4(_) => v4.push(*net),
                IpNet::V6(_) => v6.push(*net),
            }
        }
        Self {
            raw: nets,
            configured_count,
            v4: SortedCidrList::from_cidrs(v4),
            v6: SortedCidrList::from_cidrs(v6),
        }
    }

    /// True iff the field was left unconfigured (zero entries, valid or
    /// not). A field configured with only malformed entries is *not*
    /// empty -- it is a configured, always-non-matching category.
    pub fn is_empty(&self) -> bool {
        self.configured_count == 0
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.v4.contains(ip),
            IpAddr::V6(_) => self.v6.contains(ip),
        }
    }

    /// Concatenate entries (order preserved, self's entries first) and
    /// rebuild the sorted structure -- used by the merger (spec §4.3).
    pub fn merged_with(self, other: Self) -> Self {
        let mut nets = self.raw;
        nets.extend(other.raw);
        Self::from_nets(nets, self.configured_count + other.configured_count)
    }
}

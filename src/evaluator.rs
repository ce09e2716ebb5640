//! The evaluator (C6): orchestrates the matchers, ledger, GeoIP resolver
//! and script runner into the single admit/deny predicate `should_host`
//! (spec §4.6).
//!
//! Structured as a short-circuiting AND chain over ordered sub-predicates,
//! generalized to the 14 categories spec §4.6 lists, and cross-checked
//! against `conditionals_test.go`'s per-category
//! `TestRequestConditions_ShouldHost_*` expectations.

use std::net::IpAddr;

use tracing::debug;

use crate::condition::ConditionDoc;
use crate::geoip::GeoIp;
use crate::ledger::HitLedger;
use crate::request::{client_identity, Request};
use crate::script::ScriptRunner;

/// The single public admit/deny predicate (spec §4.6).
///
/// Evaluated as a conjunction of 14 category-level sub-predicates, in the
/// spec-defined order, short-circuiting on the first `false`. Performs no
/// ledger writes -- the caller records a `Hit` after a `true` verdict
/// (spec §4.6's final rule).
pub fn should_host(
    request: &impl Request,
    ledger: &dyn HitLedger,
    geoip: &dyn GeoIp,
    scripts: &ScriptRunner,
    conditions: &ConditionDoc,
) -> bool {
    let client = client_identity(request.remote_addr());

    // 1. not_serving
    if conditions.not_serving {
        debug!(%client, "denied: not_serving");
        return false;
    }

    // 2. serve
    if conditions.serve > 0 {
        let count = ledger.count(&client, request.path()).unwrap_or_else(|e| {
            debug!(%client, error = %e, "ledger count read failed, treating as zero");
            0
        });
        if count >= conditions.serve {
            debug!(%client, count, serve = conditions.serve, "denied: serve budget exhausted");
            return false;
        }
    }

    // 3. prereq
    if !conditions.prereq.is_empty() {
        let visited = ledger.paths(&client).unwrap_or_else(|e| {
            debug!(%client, error = %e, "ledger paths read failed, treating as empty");
            Default::default()
        });
        if !conditions.prereq.iter().all(|p| visited.contains(p)) {
            debug!(%client, "denied: prereq chain not satisfied");
            return false;
        }
    }

    // 4. authorized_methods
    if !conditions.authorized_methods.is_empty()
        && !conditions.authorized_methods.contains(request.method())
    {
        debug!(%client, method = request.method(), "denied: method not authorized");
        return false;
    }

    // 5. authorized_headers
    if !conditions.authorized_headers.is_empty() && !conditions.authorized_headers.matches(request)
    {
        debug!(%client, "denied: header check failed");
        return false;
    }

    let client_ip: Option<IpAddr> = client.parse().ok();

    // 6. authorized_iprange
    if !conditions.authorized_iprange.is_empty() {
        let ok = client_ip.is_some_and(|ip| conditions.authorized_iprange.contains(ip));
        if !ok {
            debug!(%client, "denied: not in authorized_iprange");
            return false;
        }
    }

    // 7. blacklist_iprange
    if !conditions.blacklist_iprange.is_empty() {
        let blocked = client_ip.is_some_and(|ip| conditions.blacklist_iprange.contains(ip));
        if blocked {
            debug!(%client, "denied: in blacklist_iprange");
            return false;
        }
    }

    let user_agent = request.header("User-Agent").unwrap_or("");

    // 8. authorized_useragents
    if !conditions.authorized_user_agents.is_empty()
        && !conditions.authorized_user_agents.matches_any(user_agent)
    {
        debug!(%client, "denied: UA not in authorized_useragents");
        return false;
    }

    // 9. blacklist_useragents
    if !conditions.blacklist_user_agents.is_empty()
        && conditions.blacklist_user_agents.matches_any(user_agent)
    {
        debug!(%client, "denied: UA in blacklist_useragents");
        return false;
    }

    // 10. authorized_useragents_glob / blacklist_useragents_glob
    if !conditions.authorized_user_agents_glob.is_empty()
        && !conditions.authorized_user_agents_glob.matches_any(user_agent)
    {
        debug!(%client, "denied: UA not in authorized_useragents_glob");
        return false;
    }
    if !conditions.blacklist_user_agents_glob.is_empty()
        && conditions.blacklist_user_agents_glob.matches_any(user_agent)
    {
        debug!(%client, "denied: UA in blacklist_useragents_glob");
        return false;
    }

    // 11. geoip.authorized_countries / 12. geoip.blacklist_countries
    if !conditions.authorized_countries.is_empty() {
        let ok = client_ip.is_some_and(|ip| conditions.authorized_countries.matches(geoip, ip));
        if !ok {
            debug!(%client, "denied: country not in authorized_countries");
            return false;
        }
    }
    if !conditions.blacklist_countries.is_empty() {
        let blocked =
            client_ip.is_some_and(|ip| conditions.blacklist_countries.matches(geoip, ip));
        if blocked {
            debug!(%client, "denied: country in blacklist_countries");
            return false;
        }
    }

    // 13. authorized_ja3
    if !conditions.authorized_ja3.is_empty() {
        let ja3 = request.ja3().unwrap_or("");
        if !conditions.authorized_ja3.matches(ja3) {
            debug!(%client, "denied: JA3 not authorized");
            return false;
        }
    }

    // 14. exec
    if let Some(spec) = &conditions.exec {
        if !scripts.verify(spec) {
            debug!(%client, "denied: exec script verification failed");
            return false;
        }
    }

    true
}

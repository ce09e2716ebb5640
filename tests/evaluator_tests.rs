//! End-to-end admit/deny scenarios against `should_host`, covering the
//! concrete scenarios called out by the condition-document spec.

use path_admission::config::EngineConfig;
use path_admission::geoip::StaticGeoIp;
use path_admission::ledger::MemoryLedger;
use path_admission::request::SimpleRequest;
use path_admission::script::ScriptRunner;
use path_admission::{condition, evaluator, NilGeoIp};

fn scripts() -> ScriptRunner {
    ScriptRunner::new(&EngineConfig::default())
}

#[test]
fn empty_document_admits_any_request() {
    let doc = condition::parse(b"").unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/anything").with_remote_addr("203.0.113.1:9001");
    assert!(evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn ua_regex_admits_matching_user_agent() {
    let doc = condition::parse(b"authorized_useragents:\n  - \"non[e|a]\"\n").unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/")
        .with_remote_addr("203.0.113.2:1")
        .with_header("User-Agent", "none");
    assert!(evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn ua_glob_rejects_non_matching_agent() {
    let doc = condition::parse(b"authorized_useragents_glob:\n  - ABC\n").unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/")
        .with_remote_addr("203.0.113.3:1")
        .with_header("User-Agent", "TEST123");
    assert!(!evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn cidr_scopes_admission_to_the_block() {
    let doc = condition::parse(b"authorized_iprange:\n  - 127.0.0.1/24\n").unwrap();
    let ledger = MemoryLedger::new();

    let inside = SimpleRequest::new("GET", "/").with_remote_addr("127.0.0.1:54321");
    assert!(evaluator::should_host(
        &inside,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));

    let outside = SimpleRequest::new("GET", "/").with_remote_addr("127.0.1.1:54321");
    assert!(!evaluator::should_host(
        &outside,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn serve_once_admits_first_request_then_denies() {
    let doc = condition::parse(b"serve: 1\n").unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/payload").with_remote_addr("203.0.113.4:1");

    assert!(evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
    ledger.hit("203.0.113.4", "/payload").unwrap();
    assert!(!evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn prereq_chain_requires_prior_visit() {
    let doc = condition::parse(b"prereq:\n  - /\n").unwrap();
    let ledger = MemoryLedger::new();

    let fresh_client = SimpleRequest::new("GET", "/payload").with_remote_addr("203.0.113.5:1");
    assert!(!evaluator::should_host(
        &fresh_client,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));

    ledger.hit("203.0.113.5", "/").unwrap();
    assert!(evaluator::should_host(
        &fresh_client,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

#[test]
fn geoip_blacklist_blocks_configured_country_only() {
    let doc = condition::parse(b"geoip:\n  blacklist_countries:\n    - US\n").unwrap();
    let ledger = MemoryLedger::new();

    let us_ip = "198.51.100.20".parse().unwrap();
    let ru_ip = "198.51.100.21".parse().unwrap();
    let geo = StaticGeoIp::new().with(us_ip, "US").with(ru_ip, "RU");

    let us_request = SimpleRequest::new("GET", "/").with_remote_addr("198.51.100.20:1");
    assert!(!evaluator::should_host(
        &us_request,
        &ledger,
        &geo,
        &scripts(),
        &doc
    ));

    let ru_request = SimpleRequest::new("GET", "/").with_remote_addr("198.51.100.21:1");
    assert!(evaluator::should_host(
        &ru_request,
        &ledger,
        &geo,
        &scripts(),
        &doc
    ));
}

#[test]
fn not_serving_denies_regardless_of_other_fields() {
    let doc = condition::parse(
        b"not_serving: true\nauthorized_methods:\n  - GET\nauthorized_useragents:\n  - .*\n",
    )
    .unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/")
        .with_remote_addr("203.0.113.6:1")
        .with_header("User-Agent", "anything");
    assert!(!evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

/// Mirrors `TestRequestConditions_ShouldHost_ip_auth_wrongcidr`: an
/// `authorized_iprange` configured with only a malformed entry must still
/// deny a request whose IP can't match it, not fall through as
/// unconstrained.
#[test]
fn malformed_only_authorized_iprange_denies_rather_than_falls_through() {
    let doc = condition::parse(b"authorized_iprange:\n  - \"127.0/0.1/24\"\n").unwrap();
    let ledger = MemoryLedger::new();
    let request = SimpleRequest::new("GET", "/").with_remote_addr("203.0.113.7:1");
    assert!(!evaluator::should_host(
        &request,
        &ledger,
        &NilGeoIp,
        &scripts(),
        &doc
    ));
}

//! Parity tests across the ledger's two backends: both must honor the same
//! `HitLedger` contract (spec §4.4, §9 "ledger abstraction").

use path_admission::ledger::{HitLedger, MemoryLedger, SledLedger};

fn exercise(ledger: &impl HitLedger) {
    assert_eq!(ledger.count("203.0.113.10", "/payload").unwrap(), 0);

    ledger.hit("203.0.113.10", "/payload").unwrap();
    ledger.hit("203.0.113.10", "/payload").unwrap();
    ledger.hit("203.0.113.10", "/other").unwrap();
    assert_eq!(ledger.count("203.0.113.10", "/payload").unwrap(), 2);
    assert_eq!(ledger.count("203.0.113.10", "/other").unwrap(), 1);

    let paths = ledger.paths("203.0.113.10").unwrap();
    assert!(paths.contains("/payload"));
    assert!(paths.contains("/other"));

    assert_eq!(ledger.count("203.0.113.11", "/payload").unwrap(), 0);

    ledger.reset("203.0.113.10").unwrap();
    assert_eq!(ledger.count("203.0.113.10", "/payload").unwrap(), 0);
}

#[test]
fn memory_ledger_satisfies_the_contract() {
    exercise(&MemoryLedger::new());
}

#[test]
fn sled_ledger_satisfies_the_contract() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = SledLedger::open(dir.path().join("ledger.sled")).unwrap();
    exercise(&ledger);
}

#[test]
fn reset_all_clears_every_client_on_both_backends() {
    let memory = MemoryLedger::new();
    memory.hit("203.0.113.12", "/a").unwrap();
    memory.hit("203.0.113.13", "/b").unwrap();
    memory.reset_all().unwrap();
    assert_eq!(memory.count("203.0.113.12", "/a").unwrap(), 0);
    assert_eq!(memory.count("203.0.113.13", "/b").unwrap(), 0);

    let dir = tempfile::tempdir().unwrap();
    let sled_ledger = SledLedger::open(dir.path().join("ledger.sled")).unwrap();
    sled_ledger.hit("203.0.113.12", "/a").unwrap();
    sled_ledger.hit("203.0.113.13", "/b").unwrap();
    sled_ledger.reset_all().unwrap();
    assert_eq!(sled_ledger.count("203.0.113.12", "/a").unwrap(), 0);
    assert_eq!(sled_ledger.count("203.0.113.13", "/b").unwrap(), 0);
}

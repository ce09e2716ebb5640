//! Transient, in-memory `HitLedger` -- a `parking_lot::Mutex`-guarded map,
//! in the same guarded-map shape as `CompiledRuleSet::cache`
//! (`src/compile.rs`'s `Mutex<LruCache<..>>`), but unbounded, since the
//! ledger must never evict an entry a `serve`/`prereq` check depends on.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use super::HitLedger;
use crate::error::Result;

/// In-memory hit ledger. Not durable across restarts; intended for tests
/// and deployments that accept losing serve/prereq history on crash (spec
/// §4.4, §9).
#[derive(Default)]
pub struct MemoryLedger {
    // client -> (path -> count)
    entries: Mutex<HashMap<String, HashMap<String, u64>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HitLedger for MemoryLedger {
    fn hit(&self, client: &str, path: &str) -> Result<()> {
        let mut guard = self.entries.lock();
        let paths = guard.entry(client.to_string()).or_default();
        *paths.entry(path.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn paths(&self, client: &str) -> Result<HashSet<String>> {
        let guard = self.entries.lock();
        Ok(guard
            .get(client)
            .map(|paths| paths.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn count(&self, client: &str, path: &str) -> Result<u64> {
        let guard = self.entries.lock();
        Ok(guard
            .get(client)
            .and_then(|paths| paths.get(path))
            .copied()
            .unwrap_or(0))
    }

    fn reset(&self, client: &str) -> Result<()> {
        self.entries.lock().remove(client);
        Ok(())
    }

    fn reset_all(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

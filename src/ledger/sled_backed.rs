//! Durable, `sled`-backed `HitLedger` (spec §4.4's "durable mode, backed
//! by an embedded key-value store"). `sled`'s own internal tree locking
//! gives us the atomic per-`(client, path)` increment spec §5 requires
//! without this crate exposing a lock (see DESIGN.md for why this crate
//! was chosen).

use std::collections::HashSet;
use std::path::Path;

use super::HitLedger;
use crate::error::Result;

const SEPARATOR: u8 = 0;

fn key(client: &str, path: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(client.len() + path.len() + 1);
    k.extend_from_slice(client.as_bytes());
    k.push(SEPARATOR);
    k.extend_from_slice(path.as_bytes());
    k
}

fn client_prefix(client: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(client.len() + 1);
    k.extend_from_slice(client.as_bytes());
    k.push(SEPARATOR);
    k
}

fn split_path(full_key: &[u8], client: &str) -> Option<String> {
    let prefix_len = client.len() + 1;
    full_key
        .get(prefix_len..)
        .map(|rest| String::from_utf8_lossy(rest).into_owned())
}

fn encode_count(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

fn decode_count(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    u64::from_be_bytes(buf)
}

/// Durable hit ledger backed by an embedded `sled` database.
pub struct SledLedger {
    db: sled::Db,
}

impl SledLedger {
    /// Open (or create) a `sled` database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Wrap an already-open `sled::Db` (e.g. a temp database in tests).
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }
}

impl HitLedger for SledLedger {
    fn hit(&self, client: &str, path: &str) -> Result<()> {
        let k = key(client, path);
        self.db
            .fetch_and_update(&k, |old| {
                let current = old.map(decode_count).unwrap_or(0);
                Some(encode_count(current + 1).to_vec())
            })?;
        Ok(())
    }

    fn paths(&self, client: &str) -> Result<HashSet<String>> {
        let prefix = client_prefix(client);
        let mut out = HashSet::new();
        for entry in self.db.scan_prefix(&prefix) {
            let (k, _) = entry?;
            if let Some(path) = split_path(&k, client) {
                out.insert(path);
            }
        }
        Ok(out)
    }

    fn count(&self, client: &str, path: &str) -> Result<u64> {
        let k = key(client, path);
        Ok(self.db.get(&k)?.map(|v| decode_count(&v)).unwrap_or(0))
    }

    fn reset(&self, client: &str) -> Result<()> {
        let prefix = client_prefix(client);
        let keys: Vec<sled::IVec> = self
            .db
            .scan_prefix(&prefix)
            .map(|entry| entry.map(|(k, _)| k))
            .collect::<std::result::Result<Vec<sled::IVec>, sled::Error>>()?;
        for k in keys {
            self.db.remove(k)?;
        }
        Ok(())
    }

    fn reset_all(&self) -> Result<()> {
        self.db.clear()?;
        Ok(())
    }
}

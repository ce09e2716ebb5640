use std::collections::HashSet;

/// Exact lowercase-hex equality against a set of JA3 fingerprints (spec
/// §4.1).
#[derive(Debug, Clone, Default)]
pub struct Ja3Matcher {
    hashes: HashSet<String>,
}

impl Ja3Matcher {
    pub fn new(hashes: HashSet<String>) -> Self {
        Self { hashes }
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn matches(&self, ja3: &str) -> bool {
        self.hashes.contains(ja3)
    }

    pub fn merged_with(mut self, other: Self) -> Self {
        self.hashes.extend(other.hashes);
        self
    }

    pub fn hashes(&self) -> &HashSet<String> {
        &self.hashes
    }
}

/// True iff `s` is exactly 32 lowercase hex characters (an MD5 digest).
pub fn is_valid_ja3(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

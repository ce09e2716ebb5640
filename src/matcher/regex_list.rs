use regex::Regex;

/// A compiled list of regex patterns, matched as an unanchored search
/// (spec §4.1, §8 -- "Regex UA matching treats the pattern as an
/// unanchored search").
///
/// Whether an empty list means "vacuously true" or "vacuously false" is
/// context-dependent (authorized vs. blacklist fields); this matcher only
/// reports whether *any* pattern matched, and the evaluator applies the
/// authorized/blacklist distinction (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct RegexListMatcher {
    patterns: Vec<Regex>,
}

impl RegexListMatcher {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if at least one pattern finds a match anywhere in `subject`.
    pub fn matches_any(&self, subject: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(subject))
    }

    /// Concatenate two matchers' pattern lists, preserving order
    /// (self's patterns first) -- used by the merger (spec §4.3).
    pub fn merged_with(mut self, other: Self) -> Self {
        self.patterns.extend(other.patterns);
        self
    }
}

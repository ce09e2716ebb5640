use crate::request::Request;

/// Exact header-value equality. All configured pairs must match (AND
/// across headers, spec §4.1). Header names are stored canonicalized
/// (lowercased); lookup goes through `Request::header`, which
/// implementations are expected to resolve case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct HeaderMatcher {
    pairs: Vec<(String, String)>,
}

impl HeaderMatcher {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let pairs = pairs
            .into_iter()
            .map(|(name, value)| (canonicalize(&name), value))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn matches(&self, request: &impl Request) -> bool {
        self.pairs
            .iter()
            .all(|(name, expected)| request.header(name) == Some(expected.as_str()))
    }

    /// Key-wise union; later matcher wins on conflicting key (spec §4.3).
    pub fn merged_with(self, other: Self) -> Self {
        let mut pairs = self.pairs;
        for (name, value) in other.pairs {
            if let Some(existing) = pairs.iter_mut().find(|(n, _)| *n == name) {
                existing.1 = value;
            } else {
                pairs.push((name, value));
            }
        }
        Self { pairs }
    }
}

/// Canonical header-name form used for storage and comparison.
pub fn canonicalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

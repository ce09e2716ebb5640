//! The condition document (C2): a parsed, validated representation of one
//! YAML policy file (spec §3, §4.2, §6.1).

use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;

use crate::error::{AdmissionError, Result};
use crate::matcher::{
    is_valid_ja3, CountrySetMatcher, GlobListMatcher, HeaderMatcher, IpRangeMatcher, Ja3Matcher,
    RegexListMatcher,
};

/// Raw, as-deserialized shape of a condition document (spec §6.1). Unknown
/// top-level keys are tolerated by default (serde ignores fields it
/// doesn't recognize unless `deny_unknown_fields` is set, which we do not
/// set -- spec §4.2 "forward compat").
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConditionDoc {
    authorized_useragents: Vec<String>,
    blacklist_useragents: Vec<String>,
    authorized_useragents_glob: Vec<String>,
    blacklist_useragents_glob: Vec<String>,
    authorized_iprange: Vec<String>,
    blacklist_iprange: Vec<String>,
    authorized_methods: Vec<String>,
    authorized_headers: std::collections::HashMap<String, String>,
    authorized_ja3: Vec<String>,
    geoip: RawGeoIp,
    not_serving: bool,
    serve: u64,
    prereq: Vec<String>,
    exec: Option<RawExec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGeoIp {
    authorized_countries: Vec<String>,
    blacklist_countries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawExec {
    script: String,
    output: String,
}

/// A compiled external-script verification spec (spec §3's `exec`
/// sub-record).
#[derive(Debug, Clone)]
pub struct ExecSpec {
    pub script: PathBuf,
    pub output: String,
}

/// A parsed and compiled condition document -- the evaluator-ready form of
/// one (or several merged) YAML policy files (spec §3).
///
/// Every field is "unconstrained" by default; absence never narrows
/// admission, only configured fields do (spec §4.6's master rule).
#[derive(Debug, Default, Clone)]
pub struct ConditionDoc {
    pub authorized_user_agents: RegexListMatcher,
    pub blacklist_user_agents: RegexListMatcher,
    pub authorized_user_agents_glob: GlobListMatcher,
    pub blacklist_user_agents_glob: GlobListMatcher,
    pub authorized_iprange: IpRangeMatcher,
    pub blacklist_iprange: IpRangeMatcher,
    pub authorized_methods: HashSet<String>,
    pub authorized_headers: HeaderMatcher,
    pub authorized_ja3: Ja3Matcher,
    pub authorized_countries: CountrySetMatcher,
    pub blacklist_countries: CountrySetMatcher,
    pub not_serving: bool,
    pub serve: u64,
    pub prereq: Vec<String>,
    pub exec: Option<ExecSpec>,
}

/// Parse one condition document from YAML bytes (spec §4.2).
///
/// Empty input yields the all-unconstrained document. A compile failure on
/// any `authorized_useragents`/`blacklist_useragents` pattern -- including a
/// leading `*` (almost always a user intending the glob field instead) --
/// is a fatal parse error naming the field and pattern. An `authorized_ja3`
/// entry that isn't 32 lowercase hex characters is likewise a fatal parse
/// error, not a silently-unmatchable one -- unlike `*_iprange` below, a
/// JA3 fingerprint has a single fixed format, so a malformed entry is
/// always a typo worth failing loudly on. Malformed `*_iprange` entries
/// are *not* a parse error; they are silently unmatchable at evaluation
/// time (spec §3 invariant (b), §9 Open Question).
pub fn parse(bytes: &[u8]) -> Result<ConditionDoc> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ConditionDoc::default());
    }

    let raw: RawConditionDoc = serde_yaml::from_slice(bytes)?;
    compile(raw)
}

fn compile_regex_list(field: &'static str, patterns: Vec<String>) -> Result<RegexListMatcher> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        if pattern.starts_with('*') {
            return Err(AdmissionError::LeadingGlobInRegexField { field, pattern });
        }
        let regex = Regex::new(&pattern).map_err(|source| AdmissionError::InvalidPattern {
            field,
            pattern: pattern.clone(),
            source,
        })?;
        compiled.push(regex);
    }
    Ok(RegexListMatcher::new(compiled))
}

fn compile_ja3_set(field: &'static str, hashes: Vec<String>) -> Result<HashSet<String>> {
    let mut compiled = HashSet::with_capacity(hashes.len());
    for hash in hashes {
        let lowered = hash.to_lowercase();
        if !is_valid_ja3(&lowered) {
            return Err(AdmissionError::InvalidJa3 {
                field,
                pattern: hash,
            });
        }
        compiled.insert(lowered);
    }
    Ok(compiled)
}

fn compile(raw: RawConditionDoc) -> Result<ConditionDoc> {
    let authorized_user_agents =
        compile_regex_list("authorized_useragents", raw.authorized_useragents)?;
    let blacklist_user_agents =
        compile_regex_list("blacklist_useragents", raw.blacklist_useragents)?;

    let authorized_user_agents_glob = GlobListMatcher::new(raw.authorized_useragents_glob);
    let blacklist_user_agents_glob = GlobListMatcher::new(raw.blacklist_useragents_glob);

    let authorized_iprange = IpRangeMatcher::new(&raw.authorized_iprange);
    let blacklist_iprange = IpRangeMatcher::new(&raw.blacklist_iprange);

    let authorized_methods = raw
        .authorized_methods
        .into_iter()
        .map(|m| m.to_uppercase())
        .collect();

    let authorized_headers = HeaderMatcher::new(raw.authorized_headers.into_iter().collect());

    let authorized_ja3 = Ja3Matcher::new(compile_ja3_set("authorized_ja3", raw.authorized_ja3)?);

    let authorized_countries = CountrySetMatcher::new(
        raw.geoip
            .authorized_countries
            .into_iter()
            .map(|c| c.to_uppercase())
            .collect(),
    );
    let blacklist_countries = CountrySetMatcher::new(
        raw.geoip
            .blacklist_countries
            .into_iter()
            .map(|c| c.to_uppercase())
            .collect(),
    );

    let exec = raw.exec.map(|e| ExecSpec {
        script: PathBuf::from(e.script),
        output: e.output,
    });

    Ok(ConditionDoc {
        authorized_user_agents,
        blacklist_user_agents,
        authorized_user_agents_glob,
        blacklist_user_agents_glob,
        authorized_iprange,
        blacklist_iprange,
        authorized_methods,
        authorized_headers,
        authorized_ja3,
        authorized_countries,
        blacklist_countries,
        not_serving: raw.not_serving,
        serve: raw.serve,
        prereq: raw.prereq,
        exec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_unconstrained() {
        let doc = parse(b"").unwrap();
        assert!(!doc.not_serving);
        assert_eq!(doc.serve, 0);
        assert!(doc.prereq.is_empty());
        assert!(doc.exec.is_none());
    }

    #[test]
    fn test_garbage_yaml_is_parse_error() {
        let err = parse(b"abc:abc:abc:[").unwrap_err();
        assert!(matches!(err, AdmissionError::Yaml(_)));
    }

    #[test]
    fn test_authorized_useragents_regex() {
        let doc = parse(b"authorized_useragents:\n  - non[e|a]\n").unwrap();
        assert!(doc.authorized_user_agents.matches_any("none"));
        assert!(!doc.authorized_user_agents.matches_any("not_correct"));
    }

    #[test]
    fn test_leading_glob_char_in_regex_field_is_fatal() {
        let err = parse(b"authorized_useragents:\n  - \"*Chrome*\"\n").unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::LeadingGlobInRegexField { field: "authorized_useragents", .. }
        ));
    }

    #[test]
    fn test_leading_glob_char_blacklist_field_is_fatal() {
        let err = parse(b"blacklist_useragents:\n  - \"*Chrome*\"\n").unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::LeadingGlobInRegexField { field: "blacklist_useragents", .. }
        ));
    }

    #[test]
    fn test_malformed_cidr_does_not_fail_parse() {
        let doc = parse(b"authorized_iprange:\n  - 127.0/0.1/24\n").unwrap();
        assert!(!doc.authorized_iprange.contains("127.0.1.1".parse().unwrap()));
    }

    #[test]
    fn test_ja3_entries_lowercased_and_validated() {
        let doc =
            parse(b"authorized_ja3:\n  - E7D705A3286E19EA42F587B344EE6865\n").unwrap();
        assert!(doc
            .authorized_ja3
            .matches("e7d705a3286e19ea42f587b344ee6865"));
    }

    #[test]
    fn test_malformed_ja3_is_fatal() {
        let err = parse(b"authorized_ja3:\n  - too-short\n").unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InvalidJa3 { field: "authorized_ja3", .. }
        ));
    }

    #[test]
    fn test_country_codes_uppercased() {
        let doc = parse(b"geoip:\n  authorized_countries:\n    - us\n").unwrap();
        assert!(doc.authorized_countries.codes().contains("US"));
    }

    #[test]
    fn test_exec_script_need_not_exist() {
        let doc = parse(b"exec:\n  script: /nonexistent/path\n  output: ok\n").unwrap();
        assert_eq!(doc.exec.unwrap().output, "ok");
    }

    #[test]
    fn test_unknown_top_level_keys_tolerated() {
        let doc = parse(b"future_feature: true\nserve: 2\n").unwrap();
        assert_eq!(doc.serve, 2);
    }
}

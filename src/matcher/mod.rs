//! Matchers (C1): the primitive predicates condition documents are built
//! from. Each matcher family has its own matching discipline (spec §4.1);
//! the evaluator (C6) composes them with the "non-empty means enforced"
//! master rule.

mod country;
mod glob_list;
mod headers;
mod iprange;
mod ja3;
mod regex_list;

pub use country::CountrySetMatcher;
pub use glob_list::GlobListMatcher;
pub use headers::HeaderMatcher;
pub use iprange::IpRangeMatcher;
pub use ja3::{is_valid_ja3, Ja3Matcher};
pub use regex_list::RegexListMatcher;

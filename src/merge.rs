//! The merger (C3): combines N parsed condition documents into one
//! effective document via the field-by-field category union in spec §4.3.
//!
//! Documents are merged post-compile -- regex/glob patterns are already
//! precompiled, so merging concatenates the compiled matchers rather than
//! re-parsing source strings. The concatenation order and per-field rules
//! below follow `conditionals_test.go`'s `MergeRequestConditions`
//! expectations (first-doc-first ordering, later-exec-wins, serve-as-max)
//! line for line.

use crate::condition::ConditionDoc;

/// Merge zero or more condition documents into one. `merge(&[])` yields the
/// all-unconstrained document; `merge(&[d])` is structurally identical to
/// `d` (spec §8 invariant).
pub fn merge(docs: &[ConditionDoc]) -> ConditionDoc {
    let mut iter = docs.iter().cloned();
    let Some(first) = iter.next() else {
        return ConditionDoc::default();
    };
    iter.fold(first, merge_pair)
}

fn merge_pair(a: ConditionDoc, b: ConditionDoc) -> ConditionDoc {
    let authorized_methods = a
        .authorized_methods
        .into_iter()
        .chain(b.authorized_methods)
        .collect();

    let mut prereq = a.prereq;
    prereq.extend(b.prereq);

    ConditionDoc {
        authorized_user_agents: a.authorized_user_agents.merged_with(b.authorized_user_agents),
        blacklist_user_agents: a.blacklist_user_agents.merged_with(b.blacklist_user_agents),
        authorized_user_agents_glob: a
            .authorized_user_agents_glob
            .merged_with(b.authorized_user_agents_glob),
        blacklist_user_agents_glob: a
            .blacklist_user_agents_glob
            .merged_with(b.blacklist_user_agents_glob),
        authorized_iprange: a.authorized_iprange.merged_with(b.authorized_iprange),
        blacklist_iprange: a.blacklist_iprange.merged_with(b.blacklist_iprange),
        authorized_methods,
        authorized_headers: a.authorized_headers.merged_with(b.authorized_headers),
        authorized_ja3: a.authorized_ja3.merged_with(b.authorized_ja3),
        authorized_countries: a.authorized_countries.merged_with(b.authorized_countries),
        blacklist_countries: a.blacklist_countries.merged_with(b.blacklist_countries),
        not_serving: a.not_serving || b.not_serving,
        serve: merge_serve(a.serve, b.serve),
        prereq,
        exec: b.exec.or(a.exec),
    }
}

/// `serve` merge rule (spec §4.3): maximum across documents, with 0
/// treated as "unset" and dominated by any positive value.
fn merge_serve(a: u64, b: u64) -> u64 {
    match (a, b) {
        (0, x) | (x, 0) => x,
        (x, y) => x.max(y),
    }
}

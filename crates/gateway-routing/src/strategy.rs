//! Candidate ranking.
//!
//! Both strategies use a stable sort, so candidates tied on both keys keep
//! their declaration order and the same input always yields the same chain.

use crate::profile::RoutingStrategy;
use crate::resolver::Candidate;
use std::cmp::Ordering;

/// Order candidates in place; index 0 is the primary.
pub fn rank(candidates: &mut [Candidate], strategy: RoutingStrategy) {
    match strategy {
        RoutingStrategy::OrderedFailover => candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| by_weight_desc(a, b))
        }),
        RoutingStrategy::Weighted => candidates.sort_by(|a, b| {
            by_weight_desc(a, b).then_with(|| a.priority.cmp(&b.priority))
        }),
    }
}

fn by_weight_desc(a: &Candidate, b: &Candidate) -> Ordering {
    weight_key(b.weight).total_cmp(&weight_key(a.weight))
}

// Signed zeros tie and NaN ranks below every real weight.
fn weight_key(weight: f64) -> f64 {
    if weight.is_nan() {
        f64::NEG_INFINITY
    } else if weight == 0.0 {
        0.0
    } else {
        weight
    }
}

/// Split a ranked list into the primary and its fallback chain
#[must_use]
pub fn primary_and_fallbacks(ranked: &[Candidate]) -> Option<(String, Vec<String>)> {
    let (primary, rest) = ranked.split_first()?;
    Some((primary.qualified(), rest.iter().map(Candidate::qualified).collect()))
}

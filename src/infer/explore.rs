//! Two-hop explorer.
//!
//! Joins the candidate edges leaving the first word with those entering the
//! second word on their shared intermediate node, keeps the pairs whose
//! relation types form a catalogued pattern, and scores each surviving chain.
//!
//! Work is split per shared intermediate node and run on rayon. Each unit
//! only reads its two edge groups, and results are gathered in intermediate
//! id order, so the output does not depend on scheduling.

use rayon::prelude::*;

use super::filter::{EdgeGroup, IntermediateGroups, TypedEdge};
use super::patterns::PatternSet;
use super::{CandidateChain, InferSettings};

/// Score of one edge pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    /// First weight after damping.
    pub w1: f64,
    /// Second weight after damping.
    pub w2: f64,
    /// `sqrt(|w1 * w2|)` over the damped weights.
    pub combined_weight: f64,
    /// Sign of the undamped product.
    pub is_negative: bool,
}

/// Score an edge pair. Each side whose relation is the low-confidence type
/// is divided by the configured divisor first. Damping is by a positive
/// constant, so the sign is the same whether taken before or after it.
pub fn score_pair(w1: f64, r1: &str, w2: f64, r2: &str, settings: &InferSettings) -> PairScore {
    let is_negative = w1 * w2 < 0.0;
    let w1 = damp(w1, r1, settings);
    let w2 = damp(w2, r2, settings);
    PairScore {
        w1,
        w2,
        combined_weight: (w1 * w2).abs().sqrt(),
        is_negative,
    }
}

fn damp(weight: f64, relation: &str, settings: &InferSettings) -> f64 {
    if relation == settings.low_confidence_relation {
        weight / settings.low_confidence_divisor
    } else {
        weight
    }
}

/// Enumerate and score every qualifying chain `node1 -> X -> node2`.
///
/// `from_groups` are node1's outgoing candidates, `to_groups` node2's
/// incoming candidates. Returns chains unsorted, grouped by intermediate.
pub fn explore(
    node1: &str,
    node2: &str,
    from_groups: &IntermediateGroups,
    to_groups: &IntermediateGroups,
    target_relation: &str,
    patterns: &PatternSet,
    settings: &InferSettings,
) -> Vec<CandidateChain> {
    let shared: Vec<(&EdgeGroup, &EdgeGroup)> = from_groups
        .iter()
        .filter_map(|(id, from)| to_groups.get(id).map(|to| (from, to)))
        .collect();

    let ctx = ChainContext {
        node1,
        node2,
        target_relation,
        patterns,
        settings,
    };

    let chains: Vec<Vec<CandidateChain>> = shared
        .par_iter()
        .map(|(from, to)| ctx.chains_through(from, to))
        .collect();

    let chains: Vec<CandidateChain> = chains.into_iter().flatten().collect();
    tracing::debug!(
        shared_intermediates = shared.len(),
        chains = chains.len(),
        "explored two-hop chains"
    );
    chains
}

/// Read-only inputs shared by every exploration unit.
struct ChainContext<'a> {
    node1: &'a str,
    node2: &'a str,
    target_relation: &'a str,
    patterns: &'a PatternSet,
    settings: &'a InferSettings,
}

impl ChainContext<'_> {
    fn chains_through(&self, from: &EdgeGroup, to: &EdgeGroup) -> Vec<CandidateChain> {
        let intermediate = from.intermediate().name.as_str();
        let mut chains = Vec::new();
        for e1 in from.edges() {
            for e2 in to.edges() {
                if !self.patterns.contains(&e1.relation, &e2.relation) {
                    continue;
                }
                chains.push(self.chain(e1, intermediate, e2));
            }
        }
        chains
    }

    fn chain(&self, e1: &TypedEdge, intermediate: &str, e2: &TypedEdge) -> CandidateChain {
        let score = score_pair(
            e1.edge.weight,
            &e1.relation,
            e2.edge.weight,
            &e2.relation,
            self.settings,
        );
        CandidateChain {
            node1: self.node1.to_string(),
            r1_type: e1.edge.relation_type,
            r1: e1.relation.clone(),
            intermediate: intermediate.to_string(),
            r2_type: e2.edge.relation_type,
            r2: e2.relation.clone(),
            node2: self.node2.to_string(),
            target_relation: self.target_relation.to_string(),
            is_negative: score.is_negative,
            combined_weight: score.combined_weight,
            w1: score.w1,
            w2: score.w2,
        }
    }
}

//! Two-hop relation inference.
//!
//! Answers "does A hold relation R to B?" from a direct edge and from chains
//! `A -r1-> X -r2-> B` whose `(r1, r2)` pair is a catalogued pattern for R.
//!
//! Pipeline, leaves first:
//!
//! - [`patterns`]: which `(r1, r2)` pairs count as evidence for R
//! - [`filter`]: thresholded, grouped, capped candidate edges around A and B
//! - [`explore`]: joins both sides on the intermediate node and scores chains
//! - [`rank`]: orders evidence and renders explanation records
//! - [`summary`]: aggregates the top records into a verdict
//! - [`engine`]: the per-query orchestrator

pub mod engine;
pub mod explore;
pub mod filter;
pub mod patterns;
pub mod rank;
pub mod summary;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::RelationTypeId;

pub use summary::{Summary, Verdict};

/// Tunables of the inference pipeline.
///
/// Deserialized from the `[inference]` section of the config file; every
/// field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferSettings {
    /// Edges with `|w|` below this are invisible to inference.
    pub min_weight: f64,
    /// Cap on edges kept per intermediate node and direction.
    pub max_edges_per_node: usize,
    /// Relation type whose weights are damped before combination.
    pub low_confidence_relation: String,
    /// Divisor applied to the weight of a low-confidence edge.
    pub low_confidence_divisor: f64,
    /// Ranking multiplier for contradicting chains.
    pub negative_discount: f64,
    /// Number of explanations returned and aggregated.
    pub top_n: usize,
    /// Pattern token standing for the queried relation; also the key of the
    /// catalog group that applies to every relation.
    pub wildcard: String,
    /// Intermediate names containing any of these are skipped.
    pub excluded_substrings: Vec<String>,
    /// Intermediate names starting with this marker are skipped.
    pub private_prefix: String,
}

impl Default for InferSettings {
    fn default() -> Self {
        Self {
            min_weight: 5.0,
            max_edges_per_node: 50,
            low_confidence_relation: "r_associated".into(),
            low_confidence_divisor: 4.0,
            negative_discount: 0.75,
            top_n: 10,
            wildcard: "R".into(),
            excluded_substrings: vec![":".into()],
            private_prefix: "_".into(),
        }
    }
}

/// A parsed `word1 relation word2` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub word1: String,
    pub relation: String,
    pub word2: String,
}

impl Query {
    /// Parse a request line. The second word may contain spaces
    /// (`pomme r_isa légume racine` queries "légume racine").
    pub fn parse(line: &str) -> Option<Self> {
        let (word1, rest) = line.trim().split_once(char::is_whitespace)?;
        let (relation, word2) = rest.trim_start().split_once(char::is_whitespace)?;
        let word2 = word2.trim();
        if word2.is_empty() {
            return None;
        }
        Some(Self {
            word1: word1.to_string(),
            relation: relation.to_string(),
            word2: word2.to_string(),
        })
    }
}

/// A two-hop chain `node1 -r1-> intermediate -r2-> node2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateChain {
    pub node1: String,
    pub r1_type: RelationTypeId,
    pub r1: String,
    pub intermediate: String,
    pub r2_type: RelationTypeId,
    pub r2: String,
    pub node2: String,
    pub target_relation: String,
    /// The chain contradicts the target relation.
    pub is_negative: bool,
    /// `sqrt(|w1 * w2|)`.
    pub combined_weight: f64,
    /// First edge weight after damping.
    pub w1: f64,
    /// Second edge weight after damping.
    pub w2: f64,
}

/// An edge of the queried type linking the two queried nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectRelation {
    pub node1: String,
    pub relation: String,
    pub node2: String,
    /// Literal edge weight, never damped or combined.
    pub weight: f64,
}

/// One piece of evidence for or against the queried relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    Direct(DirectRelation),
    Chain(CandidateChain),
}

impl Evidence {
    /// Weight as displayed and summed: the literal edge weight for a direct
    /// relation, the combined weight for a chain.
    pub fn weight(&self) -> f64 {
        match self {
            Evidence::Direct(d) => d.weight,
            Evidence::Chain(c) => c.combined_weight,
        }
    }

    /// Whether this evidence supports the queried relation. A direct
    /// relation always does, whatever the sign of its weight.
    pub fn supports(&self) -> bool {
        match self {
            Evidence::Direct(_) => true,
            Evidence::Chain(c) => !c.is_negative,
        }
    }

    /// Human-readable description of the evidence.
    pub fn describe(&self) -> String {
        match self {
            Evidence::Direct(d) => {
                format!("{} {} {} (direct relation)", d.node1, d.relation, d.node2)
            }
            Evidence::Chain(c) => format!(
                "{} {} {} & {} {} {} (w1={}, w2={})",
                c.node1, c.r1, c.intermediate, c.intermediate, c.r2, c.node2, c.w1, c.w2
            ),
        }
    }
}

/// A ranked, presentation-ready evidence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// 1-based rank.
    pub rank: usize,
    pub supports: bool,
    pub description: String,
    /// Raw (undiscounted) weight.
    pub weight: f64,
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.supports { "yes" } else { "no" };
        write!(
            f,
            "{} | {} | {} | {:.2}",
            self.rank, flag, self.description, self.weight
        )
    }
}

/// Result of one inference query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InferenceOutcome {
    /// The relation name has no type id in the network.
    UnknownRelation { relation: String },
    /// Neither a direct edge nor a qualifying chain was found.
    NoEvidence {
        word1: String,
        relation: String,
        word2: String,
    },
    /// Ranked evidence (at most `top_n` records) and the verdict.
    Ranked {
        explanations: Vec<Explanation>,
        summary: Summary,
    },
}

impl InferenceOutcome {
    /// Render as text lines: ranked explanations followed by one summary
    /// block, or a single explanatory line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            InferenceOutcome::UnknownRelation { relation } => {
                vec![format!("Relation '{relation}' is unknown")]
            }
            InferenceOutcome::NoEvidence {
                word1,
                relation,
                word2,
            } => vec![format!("No inference found for {word1} {relation} {word2}.")],
            InferenceOutcome::Ranked {
                explanations,
                summary,
            } => explanations
                .iter()
                .map(|e| e.to_string())
                .chain(std::iter::once(summary.to_string()))
                .collect(),
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            InferenceOutcome::Ranked { summary, .. } => Some(summary),
            _ => None,
        }
    }

    pub fn explanations(&self) -> &[Explanation] {
        match self {
            InferenceOutcome::Ranked { explanations, .. } => explanations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(weight: f64, negative: bool) -> CandidateChain {
        CandidateChain {
            node1: "chat".into(),
            r1_type: RelationTypeId(6),
            r1: "r_isa".into(),
            intermediate: "félin".into(),
            r2_type: RelationTypeId(9),
            r2: "r_has_part".into(),
            node2: "griffe".into(),
            target_relation: "r_has_part".into(),
            is_negative: negative,
            combined_weight: weight,
            w1: 40.0,
            w2: 30.0,
        }
    }

    #[test]
    fn query_parses_three_parts() {
        let q = Query::parse("  chat   r_isa animal ").unwrap();
        assert_eq!(q.word1, "chat");
        assert_eq!(q.relation, "r_isa");
        assert_eq!(q.word2, "animal");
    }

    #[test]
    fn query_keeps_spaces_in_last_word() {
        let q = Query::parse("patate r_syn pomme de terre").unwrap();
        assert_eq!(q.word2, "pomme de terre");
    }

    #[test]
    fn query_rejects_short_lines() {
        assert!(Query::parse("chat r_isa").is_none());
        assert!(Query::parse("chat").is_none());
        assert!(Query::parse("").is_none());
    }

    #[test]
    fn chain_description_names_both_hops() {
        let e = Evidence::Chain(chain(34.64, false));
        assert_eq!(
            e.describe(),
            "chat r_isa félin & félin r_has_part griffe (w1=40, w2=30)"
        );
        assert!(e.supports());
    }

    #[test]
    fn direct_evidence_keeps_literal_weight() {
        let e = Evidence::Direct(DirectRelation {
            node1: "Paris".into(),
            relation: "capital_of".into(),
            node2: "France".into(),
            weight: 12.0,
        });
        assert_eq!(e.weight(), 12.0);
        assert!(e.supports());
        assert_eq!(e.describe(), "Paris capital_of France (direct relation)");
    }

    #[test]
    fn negative_direct_evidence_still_supports() {
        let e = Evidence::Direct(DirectRelation {
            node1: "baleine".into(),
            relation: "r_isa".into(),
            node2: "poisson".into(),
            weight: -40.0,
        });
        assert!(e.supports());
        assert_eq!(e.weight(), -40.0);
    }

    #[test]
    fn explanation_renders_two_decimals() {
        let ex = Explanation {
            rank: 1,
            supports: false,
            description: "x".into(),
            weight: 7.0,
        };
        assert_eq!(ex.to_string(), "1 | no | x | 7.00");
    }

    #[test]
    fn settings_default_thresholds() {
        let s = InferSettings::default();
        assert_eq!(s.min_weight, 5.0);
        assert_eq!(s.max_edges_per_node, 50);
        assert_eq!(s.low_confidence_relation, "r_associated");
        assert_eq!(s.top_n, 10);
    }

    #[test]
    fn unknown_relation_is_a_single_line() {
        let outcome = InferenceOutcome::UnknownRelation {
            relation: "xyz_unknown".into(),
        };
        let lines = outcome.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("unknown"));
        assert!(outcome.summary().is_none());
    }
}

//! Query orchestrator.
//!
//! Runs one query through a linear sequence of stages: resolve the relation,
//! check for a direct edge, build the pattern set, filter both sides, explore,
//! rank, summarize. A stage that finds nothing to work with ends the query
//! with an explanatory outcome rather than an error.

use std::sync::Arc;

use tracing::{debug, info};

use crate::graph::{Direction, GraphAccessor, RelationTypeId};

use super::explore::explore;
use super::filter::filter_edges;
use super::patterns::PatternCatalog;
use super::rank::{format, rank, select_top};
use super::summary::summarize;
use super::{DirectRelation, Evidence, InferSettings, InferenceOutcome};

/// Stateless inference engine. Per-query state lives on the stack of
/// [`InferEngine::run`]; caches belong to the graph accessor.
pub struct InferEngine {
    graph: Arc<dyn GraphAccessor>,
    catalog: PatternCatalog,
    settings: InferSettings,
}

impl InferEngine {
    pub fn new(
        graph: Arc<dyn GraphAccessor>,
        catalog: PatternCatalog,
        settings: InferSettings,
    ) -> Self {
        Self {
            graph,
            catalog,
            settings,
        }
    }

    /// Engine over the built-in pattern catalog with default settings.
    pub fn with_defaults(graph: Arc<dyn GraphAccessor>) -> Self {
        Self::new(graph, PatternCatalog::builtin(), InferSettings::default())
    }

    pub fn graph(&self) -> &dyn GraphAccessor {
        self.graph.as_ref()
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &InferSettings {
        &self.settings
    }

    /// Answer `word1 relation word2` as text lines: ranked explanations
    /// followed by one summary block, or a single explanatory line.
    pub fn infer(&self, word1: &str, relation: &str, word2: &str) -> Vec<String> {
        self.run(word1, relation, word2).lines()
    }

    /// Answer `word1 relation word2` as a structured outcome.
    pub fn run(&self, word1: &str, relation: &str, word2: &str) -> InferenceOutcome {
        let settings = &self.settings;
        info!(word1, relation, word2, "inference query");

        let Some(relation_id) = self.graph.relation_type_id(relation) else {
            info!(relation, "unknown relation type");
            return InferenceOutcome::UnknownRelation {
                relation: relation.to_string(),
            };
        };
        debug!(relation, id = %relation_id, "resolved relation");

        let mut evidence: Vec<Evidence> = self
            .direct_relations(word1, relation, relation_id, word2)
            .into_iter()
            .map(Evidence::Direct)
            .collect();
        debug!(direct = evidence.len(), "checked direct relation");

        let patterns = self.catalog.patterns_for(relation, &settings.wildcard);
        let first_types = patterns.first_types();
        let second_types = patterns.second_types();
        debug!(
            patterns = patterns.len(),
            first_types = first_types.len(),
            second_types = second_types.len(),
            "built pattern set"
        );

        let from_groups = filter_edges(
            self.graph.as_ref(),
            word1,
            Direction::From,
            &first_types,
            settings,
        );
        let to_groups = filter_edges(
            self.graph.as_ref(),
            word2,
            Direction::To,
            &second_types,
            settings,
        );

        let chains = explore(
            word1,
            word2,
            &from_groups,
            &to_groups,
            relation,
            &patterns,
            settings,
        );
        evidence.extend(chains.into_iter().map(Evidence::Chain));

        if evidence.is_empty() {
            info!(word1, relation, word2, "no inference found");
            return InferenceOutcome::NoEvidence {
                word1: word1.to_string(),
                relation: relation.to_string(),
                word2: word2.to_string(),
            };
        }

        let total = evidence.len();
        let explanations = format(select_top(rank(evidence, settings), settings.top_n));

        let summary = summarize(&explanations, word1, relation, word2, settings.top_n);
        info!(
            evidence = total,
            verdict = %summary.verdict,
            positives = summary.positives,
            negatives = summary.negatives,
            "inference done"
        );

        InferenceOutcome::Ranked {
            explanations,
            summary,
        }
    }

    /// Edges `word1 -> word2` of the target type that pass the weight
    /// threshold, with their literal weights.
    fn direct_relations(
        &self,
        word1: &str,
        relation: &str,
        relation_id: RelationTypeId,
        word2: &str,
    ) -> Vec<DirectRelation> {
        let Some(edges) = self.graph.edges_between(word1, word2) else {
            return Vec::new();
        };
        edges
            .into_iter()
            .filter(|e| e.relation_type == relation_id)
            .filter(|e| e.weight.abs() >= self.settings.min_weight)
            .map(|e| DirectRelation {
                node1: word1.to_string(),
                relation: relation.to_string(),
                node2: word2.to_string(),
                weight: e.weight,
            })
            .collect()
    }
}

impl std::fmt::Debug for InferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferEngine")
            .field("catalog_groups", &self.catalog.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

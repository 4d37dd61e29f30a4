//! Candidate edge filter.
//!
//! Reads the edges of one queried word in one direction and keeps those that
//! can take part in a two-hop chain: strong enough, of an allowed relation
//! type, and leading to an intermediate node worth reasoning through. The
//! survivors are grouped by intermediate node, each group holding at most
//! `max_edges_per_node` edges in descending `|w|` order.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::graph::{Direction, Edge, GraphAccessor, Node, NodeId, RelationTypeId};

use super::InferSettings;

/// An edge annotated with its relation type name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedEdge {
    pub edge: Edge,
    pub relation: String,
}

/// The edges linking a queried word to one intermediate node.
///
/// Bounded: inserting keeps the group sorted by descending `|w|` and never
/// lets it grow past its capacity. Equal weights keep insertion order.
#[derive(Debug, Clone)]
pub struct EdgeGroup {
    intermediate: Node,
    edges: Vec<TypedEdge>,
    capacity: usize,
}

impl EdgeGroup {
    pub fn new(intermediate: Node, capacity: usize) -> Self {
        Self {
            intermediate,
            edges: Vec::with_capacity(capacity.min(16)),
            capacity,
        }
    }

    /// Insert an edge, evicting the weakest one when full.
    /// Returns false if the edge was too weak to be kept.
    pub fn insert(&mut self, edge: TypedEdge) -> bool {
        let magnitude = edge.edge.weight.abs();
        let pos = self
            .edges
            .partition_point(|e| e.edge.weight.abs() >= magnitude);
        if pos >= self.capacity {
            return false;
        }
        self.edges.insert(pos, edge);
        self.edges.truncate(self.capacity);
        true
    }

    pub fn intermediate(&self) -> &Node {
        &self.intermediate
    }

    pub fn edges(&self) -> &[TypedEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Candidate edges keyed by intermediate node id, in id order.
pub type IntermediateGroups = BTreeMap<NodeId, EdgeGroup>;

/// Whether a node name is structurally uninteresting as an intermediate:
/// empty, a bare numeric id, carrying a marker substring (grammatical and
/// metadata nodes such as `Nom:Masc+SG`), or private (`_COM`, ...).
pub fn is_uninteresting_name(name: &str, settings: &InferSettings) -> bool {
    name.is_empty()
        || name.chars().all(|c| c.is_ascii_digit())
        || (!settings.private_prefix.is_empty() && name.starts_with(&settings.private_prefix))
        || settings
            .excluded_substrings
            .iter()
            .any(|s| !s.is_empty() && name.contains(s.as_str()))
}

/// Collect the candidate edges of `node` in `direction` whose relation type
/// is one of `allowed_types`, grouped by intermediate node.
///
/// Absent graph data yields an empty map.
pub fn filter_edges<G>(
    graph: &G,
    node: &str,
    direction: Direction,
    allowed_types: &[String],
    settings: &InferSettings,
) -> IntermediateGroups
where
    G: GraphAccessor + ?Sized,
{
    if allowed_types.is_empty() {
        return IntermediateGroups::new();
    }
    let Some(edges) = graph.edges(node, direction) else {
        debug!(node, %direction, "no relations");
        return IntermediateGroups::new();
    };
    let fetched = edges.len();

    let allowed: HashSet<&str> = allowed_types.iter().map(String::as_str).collect();
    let mut names: HashMap<RelationTypeId, Option<String>> = HashMap::new();

    let retained: Vec<TypedEdge> = edges
        .into_iter()
        .filter(|e| e.weight.abs() >= settings.min_weight)
        .filter_map(|edge| {
            let relation = names
                .entry(edge.relation_type)
                .or_insert_with(|| graph.relation_type_name(edge.relation_type))
                .clone()?;
            allowed
                .contains(relation.as_str())
                .then_some(TypedEdge { edge, relation })
        })
        .collect();

    let mut ids: Vec<NodeId> = retained
        .iter()
        .map(|t| direction.other_endpoint(&t.edge))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    graph.prefetch_nodes(&ids);

    let intermediates: HashMap<NodeId, Node> = ids
        .into_iter()
        .filter_map(|id| graph.node_by_id(id))
        .filter(|n| !is_uninteresting_name(&n.name, settings))
        .map(|n| (n.id, n))
        .collect();

    let mut groups = IntermediateGroups::new();
    for typed in retained {
        let id = direction.other_endpoint(&typed.edge);
        let Some(intermediate) = intermediates.get(&id) else {
            continue;
        };
        groups
            .entry(id)
            .or_insert_with(|| EdgeGroup::new(intermediate.clone(), settings.max_edges_per_node))
            .insert(typed);
    }

    debug!(
        node,
        %direction,
        fetched,
        intermediates = groups.len(),
        "filtered candidate edges"
    );
    groups
}

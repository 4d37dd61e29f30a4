//! In-memory lexical network.
//!
//! Nodes are indexed by id and by name, edges by source and by target, all in
//! `DashMap`s so the graph can be shared with rayon workers. Used by tests,
//! benchmarks and the CLI's offline `--fixture` mode.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

use super::registry::RelationRegistry;
use super::{Edge, GraphAccessor, Node, NodeId, RelationType, RelationTypeId};

/// On-disk fixture layout, mirroring the JDM listing payloads.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub relation_types: Vec<RelationType>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relations: Vec<Edge>,
}

/// In-memory graph implementing [`GraphAccessor`].
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: DashMap<NodeId, Node>,
    names: DashMap<String, NodeId>,
    relations: RelationRegistry,
    outgoing: DashMap<NodeId, Vec<Edge>>,
    incoming: DashMap<NodeId, Vec<Edge>>,
    next_id: AtomicI64,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Build a graph from a parsed fixture.
    pub fn from_fixture(fixture: Fixture) -> Self {
        let graph = Self::new();
        graph.relations.extend(fixture.relation_types);
        for node in fixture.nodes {
            graph.insert_node(node);
        }
        for edge in fixture.relations {
            graph.insert_edge(edge);
        }
        graph
    }

    /// Parse a fixture from JSON text.
    pub fn from_fixture_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = serde_json::from_str(json).map_err(|e| FixtureError::Parse {
            message: e.to_string(),
        })?;
        Ok(Self::from_fixture(fixture))
    }

    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|e| FixtureError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_fixture_json(&content)
    }

    /// Insert a node with an explicit id. Later inserts with the same id win.
    pub fn insert_node(&self, node: Node) {
        self.next_id.fetch_max(node.id.0 + 1, Ordering::Relaxed);
        self.names.insert(node.name.clone(), node.id);
        self.nodes.insert(node.id, node);
    }

    /// Return the id of the node called `name`, creating it if needed.
    pub fn node(&self, name: &str) -> NodeId {
        if let Some(id) = self.names.get(name) {
            return *id.value();
        }
        let id = NodeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.insert_node(Node::new(id, name));
        id
    }

    pub fn add_relation_type(&self, id: i64, name: &str) -> RelationTypeId {
        let id = RelationTypeId(id);
        self.relations.insert(RelationType::new(id, name));
        id
    }

    pub fn insert_edge(&self, edge: Edge) {
        self.incoming.entry(edge.target).or_default().push(edge.clone());
        self.outgoing.entry(edge.source).or_default().push(edge);
    }

    /// Add `source -relation-> target` by names. Unknown relation names are ignored.
    pub fn relate(&self, source: &str, relation: &str, target: &str, weight: f64) -> Option<Edge> {
        let relation_type = self.relations.id_of(relation)?;
        let edge = Edge::new(self.node(source), self.node(target), relation_type, weight);
        self.insert_edge(edge.clone());
        Some(edge)
    }

    pub fn node_by_name(&self, name: &str) -> Option<Node> {
        let id = *self.names.get(name)?.value();
        self.nodes.get(&id).map(|n| n.value().clone())
    }

    pub fn relation_types(&self) -> Vec<RelationType> {
        self.relations.all()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edges_of(&self, index: &DashMap<NodeId, Vec<Edge>>, name: &str) -> Option<Vec<Edge>> {
        let id = *self.names.get(name)?.value();
        Some(index.get(&id).map(|e| e.value().clone()).unwrap_or_default())
    }
}

impl GraphAccessor for MemoryGraph {
    fn relation_type_id(&self, name: &str) -> Option<RelationTypeId> {
        self.relations.id_of(name)
    }

    fn relation_type_name(&self, id: RelationTypeId) -> Option<String> {
        self.relations.name_of(id)
    }

    fn edges_from(&self, node: &str) -> Option<Vec<Edge>> {
        self.edges_of(&self.outgoing, node)
    }

    fn edges_to(&self, node: &str) -> Option<Vec<Edge>> {
        self.edges_of(&self.incoming, node)
    }

    fn edges_between(&self, a: &str, b: &str) -> Option<Vec<Edge>> {
        let target = *self.names.get(b)?.value();
        let edges = self.edges_from(a)?;
        Some(edges.into_iter().filter(|e| e.target == target).collect())
    }

    fn node_by_id(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(&id).map(|n| n.value().clone())
    }
}

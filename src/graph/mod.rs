//! Lexical network access layer.
//!
//! The inference core reads the network through the [`GraphAccessor`] trait
//! only. Two implementations ship with the crate:
//!
//! - **Remote** ([`remote::JdmClient`]): the JeuxDeMots REST API over `ureq`,
//!   with a disk response cache ([`cache::ResponseCache`]) and an in-memory
//!   node cache
//! - **In-memory** ([`memory::MemoryGraph`]): a `DashMap`-indexed graph used
//!   for tests, benchmarks and offline fixtures
//!
//! Every lookup may return `None` to signal absence. Callers treat absence as
//! "no relations exist", never as a fault.

pub mod cache;
pub mod memory;
pub mod registry;
pub mod remote;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a node in the lexical network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a relation type (`r_isa`, `r_has_part`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationTypeId(pub i64);

impl fmt::Display for RelationTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A word or concept of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    /// JDM node type (term, POS marker, refinement, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<i64>,
    /// Node weight (popularity) as reported by the network.
    #[serde(default, rename = "w", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Node {
    /// Create a node with just an id and a name.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            node_type: None,
            weight: None,
        }
    }
}

/// A directed, typed, signed-weighted relation instance.
///
/// Field names follow the JDM wire format (`node1`, `node2`, `type`, `w`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "node1")]
    pub source: NodeId,
    #[serde(rename = "node2")]
    pub target: NodeId,
    #[serde(rename = "type")]
    pub relation_type: RelationTypeId,
    /// Signed weight: negative weights assert the relation does *not* hold.
    #[serde(rename = "w")]
    pub weight: f64,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, relation_type: RelationTypeId, weight: f64) -> Self {
        Self {
            source,
            target,
            relation_type,
            weight,
        }
    }
}

/// A relation type of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationType {
    pub id: RelationTypeId,
    pub name: String,
    /// Human-facing name.
    #[serde(default, rename = "gpname", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl RelationType {
    pub fn new(id: RelationTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
            help: None,
        }
    }
}

/// A node type of the network (term, part of speech, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub id: i64,
    pub name: String,
}

/// Which view of a node's edges to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outgoing edges: the node is the source.
    From,
    /// Incoming edges: the node is the target.
    To,
}

impl Direction {
    /// The endpoint of `edge` on the far side of the queried node.
    pub fn other_endpoint(self, edge: &Edge) -> NodeId {
        match self {
            Direction::From => edge.target,
            Direction::To => edge.source,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::From => write!(f, "from"),
            Direction::To => write!(f, "to"),
        }
    }
}

/// Read-only lookups the inference core needs from the lexical network.
///
/// Implementations own their caches and must degrade to `None` on transport
/// failure rather than panic. They are shared across rayon workers, hence
/// `Send + Sync`.
pub trait GraphAccessor: Send + Sync {
    /// Resolve a relation type name to its id.
    fn relation_type_id(&self, name: &str) -> Option<RelationTypeId>;

    /// Resolve a relation type id to its name.
    fn relation_type_name(&self, id: RelationTypeId) -> Option<String>;

    /// All edges whose source is the node called `node`.
    fn edges_from(&self, node: &str) -> Option<Vec<Edge>>;

    /// All edges whose target is the node called `node`.
    fn edges_to(&self, node: &str) -> Option<Vec<Edge>>;

    /// All edges going from node `a` to node `b`.
    fn edges_between(&self, a: &str, b: &str) -> Option<Vec<Edge>>;

    /// Look up a node by id.
    fn node_by_id(&self, id: NodeId) -> Option<Node>;

    /// Warm the node cache for a batch of ids.
    ///
    /// Only a performance hint: the default resolves ids one by one.
    fn prefetch_nodes(&self, ids: &[NodeId]) {
        for &id in ids {
            let _ = self.node_by_id(id);
        }
    }

    /// Edges of `node` in the given direction.
    fn edges(&self, node: &str, direction: Direction) -> Option<Vec<Edge>> {
        match direction {
            Direction::From => self.edges_from(node),
            Direction::To => self.edges_to(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_endpoint_depends_on_direction() {
        let edge = Edge::new(NodeId(1), NodeId(2), RelationTypeId(6), 10.0);
        assert_eq!(Direction::From.other_endpoint(&edge), NodeId(2));
        assert_eq!(Direction::To.other_endpoint(&edge), NodeId(1));
    }

    #[test]
    fn edge_decodes_jdm_wire_format() {
        let json = r#"{"id": 991, "node1": 150, "node2": 4012, "type": 6, "w": -25}"#;
        let edge: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.source, NodeId(150));
        assert_eq!(edge.target, NodeId(4012));
        assert_eq!(edge.relation_type, RelationTypeId(6));
        assert_eq!(edge.weight, -25.0);
    }

    #[test]
    fn node_tolerates_missing_fields() {
        let node: Node = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(node.id, NodeId(7));
        assert!(node.name.is_empty());
        assert!(node.node_type.is_none());
    }

    #[test]
    fn relation_type_reads_display_name() {
        let json = r#"{"id": 6, "name": "r_isa", "gpname": "générique", "help": "is a"}"#;
        let rt: RelationType = serde_json::from_str(json).unwrap();
        assert_eq!(rt.name, "r_isa");
        assert_eq!(rt.display_name.as_deref(), Some("générique"));
    }
}

//! JeuxDeMots REST API client.
//!
//! Uses `ureq` for synchronous HTTP requests. Each response goes through
//! two cache levels: the disk [`ResponseCache`] (one JSON file per endpoint)
//! and, for nodes, an in-memory `DashMap` filled with insert-if-absent
//! semantics. Node prefetch runs on a bounded rayon pool owned by the client.
//!
//! Every failure (transport, HTTP status, undecodable payload) is logged and
//! reported to the caller as `None`.

use std::path::PathBuf;
use std::time::Duration;

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, JdmResult};

use super::cache::ResponseCache;
use super::registry::RelationRegistry;
use super::{Edge, GraphAccessor, Node, NodeId, NodeType, RelationType, RelationTypeId};

/// Public demo instance of the JDM API.
pub const DEFAULT_BASE_URL: &str = "https://jdm-api.demo.lirmm.fr/v0";

/// Configuration for the JDM client.
#[derive(Debug, Clone)]
pub struct JdmClientConfig {
    /// Base URL of the API, without trailing endpoint.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Worker threads used by [`GraphAccessor::prefetch_nodes`].
    pub prefetch_workers: usize,
    /// Disk cache directory. `None` disables the disk cache.
    pub cache_dir: Option<PathBuf>,
}

impl Default for JdmClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            prefetch_workers: 20,
            cache_dir: None,
        }
    }
}

/// Payload of the `relations/...` endpoints.
#[derive(Debug, Default, Deserialize)]
struct RelationListing {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    relations: Vec<Edge>,
}

/// Client for the JDM REST API implementing [`GraphAccessor`].
pub struct JdmClient {
    base_url: Url,
    agent: ureq::Agent,
    cache: Option<ResponseCache>,
    nodes: DashMap<NodeId, Node>,
    relation_types: RelationRegistry,
    pool: rayon::ThreadPool,
}

impl JdmClient {
    /// Create a client. No request is sent until the first lookup.
    pub fn new(config: JdmClientConfig) -> JdmResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ClientError::BaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl {
                url: config.base_url,
                message: "URL cannot carry path segments".into(),
            }
            .into());
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let cache = config.cache_dir.map(ResponseCache::open).transpose()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.prefetch_workers.max(1))
            .thread_name(|i| format!("jdm-prefetch-{i}"))
            .build()
            .map_err(|e| ClientError::Pool {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            agent,
            cache,
            nodes: DashMap::new(),
            relation_types: RelationRegistry::new(),
            pool,
        })
    }

    /// The disk cache, if enabled.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Number of nodes held in the in-memory cache.
    pub fn cached_node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Full URL of an endpoint; each segment is percent-encoded.
    pub fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// All relation types known to the network, sorted by id.
    pub fn relation_types(&self) -> Vec<RelationType> {
        self.ensure_relation_types();
        self.relation_types.all()
    }

    /// All node types known to the network.
    pub fn node_types(&self) -> Option<Vec<NodeType>> {
        self.decode(&["nodes_types"])
    }

    /// Look up a node by its name.
    pub fn node_by_name(&self, name: &str) -> Option<Node> {
        let node: Node = self.decode(&["node_by_name", name])?;
        self.remember(node.clone());
        Some(node)
    }

    /// Refinements (word senses) of a term.
    pub fn refinements(&self, name: &str) -> Option<Vec<Node>> {
        let value = self.cached_json(&["refinements", name])?;
        let nodes = match value {
            serde_json::Value::Object(mut map) => map.remove("nodes")?,
            other => other,
        };
        match serde_json::from_value::<Vec<Node>>(nodes) {
            Ok(nodes) => Some(nodes),
            Err(e) => {
                warn!(term = name, error = %e, "undecodable refinements payload");
                None
            }
        }
    }

    fn ensure_relation_types(&self) {
        if !self.relation_types.is_empty() {
            return;
        }
        if let Some(types) = self.decode::<Vec<RelationType>>(&["relations_types"]) {
            debug!(count = types.len(), "loaded relation types");
            self.relation_types.extend(types);
        }
    }

    fn remember(&self, node: Node) {
        self.nodes.entry(node.id).or_insert(node);
    }

    fn relation_listing(&self, segments: &[&str]) -> Option<Vec<Edge>> {
        let listing: RelationListing = self.decode(segments)?;
        for node in listing.nodes {
            self.remember(node);
        }
        Some(listing.relations)
    }

    fn decode<T: DeserializeOwned>(&self, segments: &[&str]) -> Option<T> {
        let value = self.cached_json(segments)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                let err = ClientError::Decode {
                    endpoint: segments.join("/"),
                    message: e.to_string(),
                };
                warn!(error = %err, "treating lookup as absent");
                None
            }
        }
    }

    /// Disk cache first, then the API. Successful answers are written back.
    fn cached_json(&self, segments: &[&str]) -> Option<serde_json::Value> {
        let endpoint = segments.join("/");

        if let Some(cache) = &self.cache {
            match cache.get(&endpoint) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => warn!(%endpoint, error = %e, "ignoring unusable cache entry"),
            }
        }

        let value = match self.fetch_json(segments) {
            Ok(value) if !value.is_null() => value,
            Ok(_) => return None,
            Err(ClientError::Status { status: 404, .. }) => {
                debug!(%endpoint, "not found in the network");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "treating lookup as absent");
                return None;
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&endpoint, &value) {
                warn!(%endpoint, error = %e, "failed to cache response");
            }
        }
        Some(value)
    }

    fn fetch_json(&self, segments: &[&str]) -> Result<serde_json::Value, ClientError> {
        let endpoint = segments.join("/");
        let url = self.url_for(segments);
        debug!(%endpoint, "requesting JDM API");

        match self.agent.get(url.as_str()).call() {
            Ok(response) => {
                response
                    .into_json::<serde_json::Value>()
                    .map_err(|e| ClientError::Decode {
                        endpoint,
                        message: e.to_string(),
                    })
            }
            Err(ureq::Error::Status(status, _)) => Err(ClientError::Status { endpoint, status }),
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Transport {
                endpoint,
                message: transport.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for JdmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JdmClient")
            .field("base_url", &self.base_url.as_str())
            .field("cache", &self.cache.as_ref().map(|c| c.dir().display().to_string()))
            .field("cached_nodes", &self.nodes.len())
            .field("relation_types", &self.relation_types.len())
            .finish()
    }
}

impl GraphAccessor for JdmClient {
    fn relation_type_id(&self, name: &str) -> Option<RelationTypeId> {
        self.ensure_relation_types();
        self.relation_types.id_of(name)
    }

    fn relation_type_name(&self, id: RelationTypeId) -> Option<String> {
        self.ensure_relation_types();
        self.relation_types.name_of(id)
    }

    fn edges_from(&self, node: &str) -> Option<Vec<Edge>> {
        self.relation_listing(&["relations", "from", node])
    }

    fn edges_to(&self, node: &str) -> Option<Vec<Edge>> {
        self.relation_listing(&["relations", "to", node])
    }

    fn edges_between(&self, a: &str, b: &str) -> Option<Vec<Edge>> {
        self.relation_listing(&["relations", "from", a, "to", b])
    }

    fn node_by_id(&self, id: NodeId) -> Option<Node> {
        if let Some(node) = self.nodes.get(&id) {
            return Some(node.value().clone());
        }
        let node: Node = self.decode(&["node_by_id", &id.to_string()])?;
        self.remember(node.clone());
        Some(node)
    }

    fn prefetch_nodes(&self, ids: &[NodeId]) {
        let missing: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| !self.nodes.contains_key(id))
            .collect();
        if missing.is_empty() {
            return;
        }
        debug!(count = missing.len(), "prefetching nodes");
        self.pool.install(|| {
            missing.par_iter().for_each(|&id| {
                let _ = self.node_by_id(id);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Discard port on localhost: any real request fails fast.
    const DEAD_URL: &str = "http://127.0.0.1:9/v0";

    fn offline_client(cache_dir: Option<PathBuf>) -> JdmClient {
        JdmClient::new(JdmClientConfig {
            base_url: DEAD_URL.into(),
            timeout_secs: 1,
            prefetch_workers: 2,
            cache_dir,
        })
        .unwrap()
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = JdmClient::new(JdmClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::JdmError::Client(ClientError::BaseUrl { .. })
        ));
    }

    #[test]
    fn url_segments_are_percent_encoded() {
        let client = offline_client(None);
        let url = client.url_for(&["relations", "from", "pomme de terre"]);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v0/relations/from/pomme%20de%20terre"
        );
        let url = client.url_for(&["relations", "from", "a/b"]);
        assert!(url.as_str().ends_with("/relations/from/a%2Fb"));
    }

    #[test]
    fn cached_listing_seeds_node_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = offline_client(Some(dir.path().to_path_buf()));
        let listing = serde_json::json!({
            "nodes": [{"id": 150, "name": "chat"}, {"id": 4012, "name": "félin"}],
            "relations": [{"id": 1, "node1": 150, "node2": 4012, "type": 6, "w": 40}]
        });
        client.cache().unwrap().put("relations/from/chat", &listing).unwrap();

        let edges = client.edges_from("chat").unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, NodeId(4012));

        // Served from memory, no request needed.
        assert_eq!(client.node_by_id(NodeId(4012)).unwrap().name, "félin");
        assert_eq!(client.cached_node_count(), 2);
        client.prefetch_nodes(&[NodeId(150), NodeId(4012)]);
    }

    #[test]
    fn cached_relation_types_resolve_both_ways() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = offline_client(Some(dir.path().to_path_buf()));
        let types = serde_json::json!([
            {"id": 0, "name": "r_associated"},
            {"id": 6, "name": "r_isa"}
        ]);
        client.cache().unwrap().put("relations_types", &types).unwrap();

        assert_eq!(client.relation_type_id("r_isa"), Some(RelationTypeId(6)));
        assert_eq!(
            client.relation_type_name(RelationTypeId(0)).as_deref(),
            Some("r_associated")
        );
        assert_eq!(client.relation_types().len(), 2);
    }

    #[test]
    fn unreachable_api_degrades_to_absent() {
        let client = offline_client(None);
        assert!(client.edges_from("chat").is_none());
        assert!(client.node_by_id(NodeId(1)).is_none());
        assert!(client.relation_type_id("r_isa").is_none());
    }

    #[test]
    fn undecodable_cached_payload_is_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = offline_client(Some(dir.path().to_path_buf()));
        client
            .cache()
            .unwrap()
            .put("node_by_id/7", &serde_json::json!({"name": "no id"}))
            .unwrap();
        assert!(client.node_by_id(NodeId(7)).is_none());
    }
}

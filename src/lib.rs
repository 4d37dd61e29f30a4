// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # jdm-infer
//!
//! Two-hop relation inference over the JeuxDeMots lexical network.
//!
//! Given `word1 relation word2`, the engine looks for a direct edge and for
//! chains `word1 -r1-> X -r2-> word2` whose `(r1, r2)` pair is a catalogued
//! pattern for the relation, ranks the evidence and concludes whether the
//! relation is probable, improbable or uncertain.
//!
//! ## Architecture
//!
//! - **Graph access** (`graph`): the [`graph::GraphAccessor`] trait, the
//!   remote JDM API client with its disk cache, and an in-memory graph
//! - **Inference** (`infer`): pattern catalog, candidate filter, two-hop
//!   explorer, ranker, aggregator and the query orchestrator
//! - **Configuration** (`config`, `paths`): TOML config under XDG directories
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use jdm_infer::graph::remote::{JdmClient, JdmClientConfig};
//! use jdm_infer::infer::engine::InferEngine;
//!
//! let client = JdmClient::new(JdmClientConfig::default()).unwrap();
//! let engine = InferEngine::with_defaults(Arc::new(client));
//! for line in engine.infer("chat", "r_has_part", "griffe") {
//!     println!("{line}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod infer;
pub mod paths;

//! Rich diagnostic error types for jdm-infer.
//!
//! The inference core never fails for a well-formed query: missing graph data
//! degrades to "no evidence". The errors below belong to the surrounding
//! plumbing (remote client, disk cache, pattern catalog, configuration) and
//! carry miette codes and help text so the CLI can explain what went wrong.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for jdm-infer.
#[derive(Debug, Error, Diagnostic)]
pub enum JdmError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),
}

// ---------------------------------------------------------------------------
// Remote client errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    #[error("invalid API base URL \"{url}\": {message}")]
    #[diagnostic(
        code(jdm::client::base_url),
        help("The base URL must be absolute, e.g. https://jdm-api.demo.lirmm.fr/v0")
    )]
    BaseUrl { url: String, message: String },

    #[error("transport error requesting {endpoint}: {message}")]
    #[diagnostic(
        code(jdm::client::transport),
        help("Check your network connection and that the JDM API is reachable.")
    )]
    Transport { endpoint: String, message: String },

    #[error("JDM API returned HTTP {status} for {endpoint}")]
    #[diagnostic(
        code(jdm::client::status),
        help("A 404 usually means the word or relation does not exist in the network.")
    )]
    Status { endpoint: String, status: u16 },

    #[error("failed to decode response for {endpoint}: {message}")]
    #[diagnostic(
        code(jdm::client::decode),
        help("The API answered with an unexpected payload. Try again or prune the cache.")
    )]
    Decode { endpoint: String, message: String },

    #[error("failed to build the node prefetch pool: {message}")]
    #[diagnostic(
        code(jdm::client::pool),
        help("Lower `prefetch_workers` in the [api] section of the configuration.")
    )]
    Pool { message: String },
}

// ---------------------------------------------------------------------------
// Disk cache errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("failed to create cache directory: {path}")]
    #[diagnostic(
        code(jdm::cache::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache I/O error on {path}")]
    #[diagnostic(
        code(jdm::cache::io),
        help("A cached response could not be read or written. Pruning the cache is safe.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted cache entry {path}: {message}")]
    #[diagnostic(
        code(jdm::cache::corrupted),
        help("The entry is deleted and fetched again on the next lookup.")
    )]
    Corrupted { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Pattern catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("failed to read pattern catalog: {path}")]
    #[diagnostic(
        code(jdm::catalog::read),
        help(
            "Ensure the file exists, or unset `file` in the [catalog] section \
             to use the built-in catalog."
        )
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern catalog: {message}")]
    #[diagnostic(
        code(jdm::catalog::parse),
        help(
            "The catalog must be a JSON object mapping relation names (or \"R\" / \"default\") \
             to lists of [\"r1\", \"r2\"] pairs."
        )
    )]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Offline fixture errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FixtureError {
    #[error("failed to read graph fixture: {path}")]
    #[diagnostic(
        code(jdm::fixture::read),
        help("Check the path passed to --fixture.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph fixture: {message}")]
    #[diagnostic(
        code(jdm::fixture::parse),
        help(
            "A fixture is a JSON object with optional \"relation_types\", \"nodes\" and \
             \"relations\" arrays, using the JDM field names (node1, node2, type, w)."
        )
    )]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(jdm::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(jdm::config::parse),
        help("Check the TOML syntax. {message}")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(jdm::config::write),
        help("Check that the config directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(jdm::config::invalid), help("{message}"))]
    Invalid { message: String },
}

/// Convenience alias for functions returning jdm-infer results.
pub type JdmResult<T> = std::result::Result<T, JdmError>;

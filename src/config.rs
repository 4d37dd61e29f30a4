//! Configuration file.
//!
//! `config.toml` under the XDG config directory. Every section and field is
//! optional; missing values take their defaults.
//!
//! ```toml
//! [api]
//! base_url = "https://jdm-api.demo.lirmm.fr/v0"
//! timeout_secs = 30
//! prefetch_workers = 20
//!
//! [cache]
//! enabled = true
//! max_age_days = 28
//!
//! [inference]
//! min_weight = 5.0
//! top_n = 10
//!
//! [catalog]
//! file = "/path/to/patterns.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ConfigError};
use crate::graph::cache::DEFAULT_MAX_AGE;
use crate::graph::remote::{DEFAULT_BASE_URL, JdmClientConfig};
use crate::infer::InferSettings;
use crate::infer::patterns::PatternCatalog;
use crate::paths::JdmPaths;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub prefetch_workers: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            prefetch_workers: 20,
        }
    }
}

/// Disk response cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Overrides the XDG cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Age after which `cache prune` removes a response.
    pub max_age_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            max_age_days: DEFAULT_MAX_AGE.as_secs() / 86_400,
        }
    }
}

/// Pattern catalog source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog file. The built-in catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JdmConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub inference: InferSettings,
    pub catalog: CatalogConfig,
}

impl JdmConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let inf = &self.inference;
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };
        if !(inf.min_weight.is_finite() && inf.min_weight >= 0.0) {
            return invalid("inference.min_weight must be a non-negative number");
        }
        if inf.max_edges_per_node == 0 {
            return invalid("inference.max_edges_per_node must be at least 1");
        }
        if !(inf.low_confidence_divisor.is_finite() && inf.low_confidence_divisor > 0.0) {
            return invalid("inference.low_confidence_divisor must be positive");
        }
        if !(inf.negative_discount.is_finite() && inf.negative_discount > 0.0) {
            return invalid("inference.negative_discount must be positive");
        }
        if inf.top_n == 0 {
            return invalid("inference.top_n must be at least 1");
        }
        if inf.wildcard.is_empty() {
            return invalid("inference.wildcard must not be empty");
        }
        if self.api.prefetch_workers == 0 {
            return invalid("api.prefetch_workers must be at least 1");
        }
        Ok(())
    }

    /// Client settings, placing the disk cache under `paths` unless the
    /// config names its own directory.
    pub fn client_config(&self, paths: &JdmPaths) -> JdmClientConfig {
        let cache_dir = self.cache.enabled.then(|| {
            self.cache
                .dir
                .clone()
                .unwrap_or_else(|| paths.responses_dir())
        });
        JdmClientConfig {
            base_url: self.api.base_url.clone(),
            timeout_secs: self.api.timeout_secs,
            prefetch_workers: self.api.prefetch_workers,
            cache_dir,
        }
    }

    /// The configured pattern catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<PatternCatalog, CatalogError> {
        match &self.catalog.file {
            Some(path) => PatternCatalog::load(path),
            None => Ok(PatternCatalog::builtin()),
        }
    }
}

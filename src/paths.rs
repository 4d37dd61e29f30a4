//! XDG-compliant path resolution for jdm-infer.
//!
//! Configuration lives under `$XDG_CONFIG_HOME/jdm-infer/` and cached API
//! responses under `$XDG_CACHE_HOME/jdm-infer/responses/`.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(jdm::paths::no_home),
        help("Set the HOME environment variable or pass explicit paths with --config.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(jdm::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for jdm-infer.
#[derive(Debug, Clone)]
pub struct JdmPaths {
    /// `$XDG_CONFIG_HOME/jdm-infer/`
    pub config_dir: PathBuf,
    /// `$XDG_CACHE_HOME/jdm-infer/`
    pub cache_dir: PathBuf,
}

impl JdmPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("jdm-infer");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("jdm-infer");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.responses_dir()] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory holding one JSON file per cached API endpoint.
    pub fn responses_dir(&self) -> PathBuf {
        self.cache_dir.join("responses")
    }
}

//! Disk cache for JDM API responses.
//!
//! One pretty-printed JSON file per endpoint. Entries never expire on read;
//! [`ResponseCache::prune`] drops stale or invalid files and is run by the
//! `cache prune` CLI command.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::CacheError;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Content prefix the API uses for muted (withdrawn) answers.
const MUTED_MARKER: &str = "MUTED";

/// Default age after which `prune` removes an entry: four weeks.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// File-per-endpoint JSON cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Open (and create if needed) a cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing an endpoint key such as `relations/from/chat`.
    pub fn file_for(&self, endpoint: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_file_name(endpoint)))
    }

    /// Read a cached response.
    ///
    /// A file that no longer parses is deleted and reported as
    /// [`CacheError::Corrupted`] so the caller can refetch.
    pub fn get(&self, endpoint: &str) -> CacheResult<Option<serde_json::Value>> {
        let path = self.file_for(endpoint);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CacheError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let _ = std::fs::remove_file(&path);
                Err(CacheError::Corrupted {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Store a response, overwriting any previous entry.
    pub fn put(&self, endpoint: &str, value: &serde_json::Value) -> CacheResult<()> {
        let path = self.file_for(endpoint);
        let content = serde_json::to_string_pretty(value).map_err(|e| CacheError::Corrupted {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| CacheError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        std::fs::read_dir(&self.dir)
            .map(|entries| entries.filter_map(|e| e.ok()).filter(|e| e.path().is_file()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove entries older than `max_age`, unreadable entries, and muted answers.
    ///
    /// Returns the number of files removed.
    pub fn prune(&self, max_age: Duration) -> CacheResult<usize> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let stale = match std::fs::read_to_string(&path) {
                Err(_) => true,
                Ok(content) => {
                    let age = entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .ok()
                        .and_then(|modified| now.duration_since(modified).ok())
                        .unwrap_or_default();
                    age > max_age || content.starts_with(MUTED_MARKER)
                }
            };

            if stale {
                std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                removed += 1;
            }
        }

        tracing::info!(removed, dir = %self.dir.display(), "pruned response cache");
        Ok(removed)
    }
}

/// Prune age for a number of days, saturating instead of overflowing.
pub fn max_age_from_days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(24 * 60 * 60))
}

/// Make an endpoint key safe to use as a file name.
///
/// `/` becomes `_`; a literal `_`, space, `:` and `%` are percent-escaped.
/// The mapping is one-to-one, so distinct endpoints never share a file.
pub fn sanitize_file_name(endpoint: &str) -> String {
    let mut out = String::with_capacity(endpoint.len());
    for c in endpoint.chars() {
        match c {
            '/' => out.push('_'),
            '_' => out.push_str("%5F"),
            ' ' => out.push_str("%20"),
            ':' => out.push_str("%3A"),
            '%' => out.push_str("%25"),
            c => out.push(c),
        }
    }
    out
}

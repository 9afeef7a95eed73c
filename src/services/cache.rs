//! Durable contribution cache store
//!
//! The store is read once before the lines-changed computation and rewritten
//! in full afterwards. Nothing else touches the file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::ContributionCache;

/// Cache store errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStoreError {
    /// IO error during persistence
    IoError(String),
    /// Serialization error
    SerializationError(String),
}

impl std::fmt::Display for CacheStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CacheStoreError {}

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache document.
    ///
    /// A missing or unreadable file yields an empty cache. Individual entries
    /// that do not decode are dropped and the rest are kept.
    pub fn load(&self) -> ContributionCache {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {}, starting empty", self.path.display());
                return ContributionCache::default();
            }
            Err(e) => {
                warn!(
                    "Failed to read cache file {}: {}. Starting empty",
                    self.path.display(),
                    e
                );
                return ContributionCache::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(
                    "Cache file {} is not valid: {}. Starting empty",
                    self.path.display(),
                    e
                );
                ContributionCache::default()
            }
        }
    }

    /// Replaces the cache file with `cache`.
    ///
    /// Writes a sibling temp file first and renames it over the target.
    pub fn save(&self, cache: &ContributionCache) -> Result<(), CacheStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CacheStoreError::IoError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(cache)
            .map_err(|e| CacheStoreError::SerializationError(e.to_string()))?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        std::fs::write(&temp_path, content).map_err(|e| CacheStoreError::IoError(e.to_string()))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| CacheStoreError::IoError(e.to_string()))?;

        debug!(
            "Saved {} cache entries to {}",
            cache.len(),
            self.path.display()
        );
        Ok(())
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Failed to parse cache file {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    fn io(key: &str, source: std::io::Error) -> Self {
        CacheError::Io {
            key: key.to_string(),
            source,
        }
    }
}

/// File-per-key JSON store.
///
/// Writes go to a temporary file in the cache directory which is then
/// renamed over the key, so readers see either the old or the new document.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| CacheError::io("<cache dir>", e))?;
        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let contents = match std::fs::read_to_string(self.path(key)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => return Err(CacheError::io(key, e)),
        };

        serde_json::from_str(&contents).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })
    }

    pub fn store_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let contents = serde_json::to_vec_pretty(value).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })?;

        let mut tmp =
            NamedTempFile::new_in(&self.cache_dir).map_err(|e| CacheError::io(key, e))?;
        tmp.write_all(&contents).map_err(|e| CacheError::io(key, e))?;
        tmp.as_file().sync_all().map_err(|e| CacheError::io(key, e))?;
        tmp.persist(self.path(key))
            .map_err(|e| CacheError::io(key, e.error))?;

        debug!(key, bytes = contents.len(), "Cache entry stored");
        Ok(())
    }

    /// Time since the entry was last written. `None` if it is missing or its
    /// mtime cannot be read.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let modified = std::fs::metadata(self.path(key))
            .and_then(|m| m.modified())
            .ok()?;
        // An mtime in the future counts as brand new
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// True if the entry is missing or older than `max_age`.
    pub fn expired(&self, key: &str, max_age: Duration) -> bool {
        match self.age(key) {
            Some(age) => age > max_age,
            None => true,
        }
    }
}

/// Human readable age, e.g. "just now", "12m ago", "3h ago", "2d ago".
pub fn age_display(age: Duration) -> String {
    let minutes = age.as_secs() / 60;
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

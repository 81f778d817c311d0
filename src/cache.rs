use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to access lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize lock file: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub hash: String,
}

/// Content hashes of the last deployed version of each script, keyed by
/// `user.script`. Persisted as JSON so unchanged scripts are skipped across
/// runs.
pub struct LockFile {
    path: PathBuf,
    entries: BTreeMap<String, LockEntry>,
}

impl LockFile {
    /// Load the lock file at `path`, creating an empty one if it is missing.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };

        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("Creating lock file at {}", path.display());
                fs::write(path, "{}").map_err(io_err)?;
                String::from("{}")
            }
            Err(e) => return Err(io_err(e)),
        };

        let entries = match serde_json::from_str(&data) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Lock file {} is corrupt, starting fresh: {}",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether `source` is what was last deployed for `name`.
    pub fn is_fresh(&self, name: &str, source: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.hash == Self::compute_hash(source))
    }

    pub fn record(&mut self, name: &str, source: &str) {
        let hash = Self::compute_hash(source);
        self.entries.insert(name.to_string(), LockEntry { hash });
    }

    pub fn get(&self, name: &str) -> Option<&LockEntry> {
        self.entries.get(name)
    }

    pub fn save(&self) -> Result<(), CacheError> {
        let data = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, data).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

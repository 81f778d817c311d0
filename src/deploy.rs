//! Deploy Module for hmd
//!
//! Moves scripts from the scripts directory into hackmud's directory,
//! skipping any whose source hash matches the lock file. A script that fails
//! to transpile is reported and left unrecorded, so the next save retries it.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::{CacheError, LockFile};
use crate::config::Config;
use crate::discovery::{find_scripts, DiscoveryError, ScriptPath};
use crate::transform::transpile;
use crate::validate::TranspileError;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Transpile {
        path: PathBuf,
        #[source]
        source: TranspileError,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Source matches the lock file.
    Unchanged,
    /// Not at `scripts/<user>/<script>.js`.
    Skipped,
    Written { path: PathBuf, chars: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeploySummary {
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A script that has been read and, if stale, transpiled.
enum Pending {
    Skip,
    Fresh,
    Ready {
        script: ScriptPath,
        source: String,
        output: String,
    },
}

pub struct Deployer {
    config: Config,
    lock: LockFile,
}

impl Deployer {
    pub fn new(config: Config) -> Result<Self, CacheError> {
        let lock = LockFile::load(&config.lock_path)?;
        Ok(Self { config, lock })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lock(&self) -> &LockFile {
        &self.lock
    }

    /// Deploy a single script.
    pub fn handle(&mut self, path: &Path) -> Result<Outcome, DeployError> {
        let pending = self.prepare(path)?;
        self.commit(pending)
    }

    /// Deploy every script under the scripts directory. Scripts are read and
    /// transpiled in parallel; writes and lock updates happen in path order.
    pub fn deploy_all(&mut self) -> DeploySummary {
        let scripts = find_scripts(&self.config.scripts_dir);
        let prepared: Vec<_> = scripts
            .par_iter()
            .map(|path| self.prepare(path))
            .collect();

        let mut summary = DeploySummary::default();
        for result in prepared {
            match result.and_then(|pending| self.commit(pending)) {
                Ok(Outcome::Written { .. }) => summary.written += 1,
                Ok(Outcome::Unchanged) => summary.unchanged += 1,
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        tracing::debug!(?summary, "Deploy finished");
        summary
    }

    fn prepare(&self, path: &Path) -> Result<Pending, DeployError> {
        let script = match ScriptPath::from_path(&self.config.scripts_dir, path) {
            Ok(script) => script,
            Err(e @ DiscoveryError::InvalidLocation(_)) => {
                tracing::warn!("{}", e);
                return Ok(Pending::Skip);
            }
        };

        let source = fs::read_to_string(path).map_err(|source| DeployError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let name = script.qualified_name();
        if self.lock.is_fresh(&name, &source) {
            tracing::debug!("{} is unchanged", name);
            return Ok(Pending::Fresh);
        }

        tracing::info!("Processing file {}/{}", script.user, script.file_name());
        let output = transpile(&source).map_err(|source| DeployError::Transpile {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Pending::Ready {
            script,
            source,
            output,
        })
    }

    fn commit(&mut self, pending: Pending) -> Result<Outcome, DeployError> {
        let (script, source, output) = match pending {
            Pending::Skip => return Ok(Outcome::Skipped),
            Pending::Fresh => return Ok(Outcome::Unchanged),
            Pending::Ready {
                script,
                source,
                output,
            } => (script, source, output),
        };

        let out_dir = self.config.deploy_dir.join(&script.user);
        fs::create_dir_all(&out_dir).map_err(|source| DeployError::Write {
            path: out_dir.clone(),
            source,
        })?;

        let out_path = out_dir.join(script.file_name());
        fs::write(&out_path, &output).map_err(|source| DeployError::Write {
            path: out_path.clone(),
            source,
        })?;

        let chars = output.chars().count();
        tracing::info!("Wrote {} characters to {}", chars, out_path.display());

        self.lock.record(&script.qualified_name(), &source);
        self.lock.save()?;

        Ok(Outcome::Written {
            path: out_path,
            chars,
        })
    }
}

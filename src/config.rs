//! Resolved filesystem layout for a deploy run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCRIPTS_DIR: &str = "scripts";
pub const DEFAULT_LOCK_FILE: &str = ".hmd.lock";
/// hackmud's script directory, relative to `$HOME`.
pub const DEFAULT_HACKMUD_DIR: &str = ".config/hackmud";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot locate the hackmud directory: set HACKMUD_DIR or HOME")]
    NoDeployDir,
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where authors keep `<user>/<script>.js`.
    pub scripts_dir: PathBuf,
    /// hackmud's own script directory.
    pub deploy_dir: PathBuf,
    pub lock_path: PathBuf,
}

impl Config {
    /// Fill unset paths with the defaults relative to `cwd` and `home`.
    pub fn resolve(
        cwd: &Path,
        home: Option<&Path>,
        scripts_dir: Option<PathBuf>,
        deploy_dir: Option<PathBuf>,
        lock_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let deploy_dir = match deploy_dir {
            Some(dir) => dir,
            None => home
                .map(|home| home.join(DEFAULT_HACKMUD_DIR))
                .ok_or(ConfigError::NoDeployDir)?,
        };

        Ok(Config {
            scripts_dir: cwd.join(scripts_dir.unwrap_or_else(|| DEFAULT_SCRIPTS_DIR.into())),
            deploy_dir: cwd.join(deploy_dir),
            lock_path: cwd.join(lock_path.unwrap_or_else(|| DEFAULT_LOCK_FILE.into())),
        })
    }

    /// Make sure the scripts directory exists, creating it on first run.
    pub fn ensure_scripts_dir(&self) -> Result<(), ConfigError> {
        match fs::metadata(&self.scripts_dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ConfigError::NotADirectory(self.scripts_dir.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("Creating directory at {}", self.scripts_dir.display());
                fs::create_dir_all(&self.scripts_dir).map_err(|source| ConfigError::CreateDir {
                    path: self.scripts_dir.clone(),
                    source,
                })
            }
            Err(source) => Err(ConfigError::CreateDir {
                path: self.scripts_dir.clone(),
                source,
            }),
        }
    }
}

//! Discovery Module for hmd
//!
//! Scripts live at `scripts/<user>/<script>.js` and deploy to
//! `<hackmud dir>/<user>/<script>.js`, where hackmud knows them as
//! `user.script`.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const SCRIPT_EXTENSION: &str = "js";

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error(
        "Script {} is in an invalid location. Scripts should be located in \"scripts/<user>/<script>.js\".",
        .0.display()
    )]
    InvalidLocation(PathBuf),
}

/// A script's owner and name, derived from its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptPath {
    pub user: String,
    pub script: String,
}

impl ScriptPath {
    /// Classify `path`, which must sit exactly one directory below `scripts_dir`.
    pub fn from_path(scripts_dir: &Path, path: &Path) -> Result<Self, DiscoveryError> {
        let invalid = || DiscoveryError::InvalidLocation(path.to_path_buf());

        let relative = path.strip_prefix(scripts_dir).map_err(|_| invalid())?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()
            .ok_or_else(invalid)?;

        let [user, file] = parts.as_slice() else {
            return Err(invalid());
        };
        let script = file
            .strip_suffix(".js")
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;

        Ok(ScriptPath {
            user: user.to_string(),
            script: script.to_string(),
        })
    }

    /// The name hackmud uses, `user.script`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.user, self.script)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.script, SCRIPT_EXTENSION)
    }
}

pub fn is_script_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION)
}

/// Recursively find all .js files under `dir`, sorted.
pub fn find_scripts(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_script_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

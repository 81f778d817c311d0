//! # hmd
//!
//! Deploys hackmud scripts written as ordinary JavaScript files.
//!
//! ## Script Contract
//!
//! 1. **Location**: scripts live at `scripts/<user>/<script>.js` and deploy to
//!    `<hackmud dir>/<user>/<script>.js`.
//!
//! 2. **Shape**: a script is exactly one statement,
//!    `module.exports = function(context, args) { ... }`. Anything else is
//!    rejected with [`TranspileError::InvalidShape`].
//!
//! 3. **Directives**: line comments of the form `// +flag [argument]`:
//!    - `+minify` compresses the script (ES2015 target, readable output)
//!    - `+mangle` also shortens local names (only with `+minify`)
//!    - `+autocomplete <text>` inserts `//<text>` as the first line of the body
//!
//! 4. **Reserved names**: `$db`, `$fs`, `$hs`, `$ms`, `$ls`, `$ns`, `$D`,
//!    `$FMCL` and `$G` become `#db` and so on; `_START` and `_TIMEOUT` become
//!    `_ST` and `_TO`.
//!
//! 5. **Output**: the bare function expression, without the
//!    `module.exports = ` prefix and without a trailing semicolon.

mod cache;
mod config;
mod deploy;
mod directives;
mod discovery;
mod globals;
mod minify;
mod renamer;
mod transform;
mod validate;
mod watch;

#[cfg(test)]
mod transform_tests;

pub use cache::{CacheError, LockEntry, LockFile};
pub use config::{Config, ConfigError};
pub use deploy::{DeployError, DeploySummary, Deployer, Outcome};
pub use directives::{scan_directives, DirectiveSet};
pub use discovery::{find_scripts, DiscoveryError, ScriptPath};
pub use globals::{canonical_name, is_reserved, reserved_names, RESERVED_NAMES};
pub use minify::minify;
pub use renamer::{IdentifierOccurrence, ReservedNameCollector};
pub use transform::{apply_edits, transpile, Edit};
pub use validate::{
    validate_script, ParseStage, ScriptShape, ShapeViolation, SourceLocation, TranspileError,
    REQUIRED_SHAPE,
};
pub use watch::watch;

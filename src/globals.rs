//! Reserved Names
//!
//! Short global names that script authors write in place of hackmud's
//! preprocessor tokens. The game rejects `#db` and friends as plain
//! JavaScript, so scripts use `$db` locally and we swap them on deploy.

/// Reserved name → canonical replacement. Fixed at build time.
pub const RESERVED_NAMES: &[(&str, &str)] = &[
    ("$db", "#db"),
    ("$fs", "#fs"),
    ("$hs", "#hs"),
    ("$ms", "#ms"),
    ("$ls", "#ls"),
    ("$ns", "#ns"),
    ("$D", "#D"),
    ("$FMCL", "#FMCL"),
    ("$G", "#G"),
    ("_START", "_ST"),
    ("_ST", "_ST"),
    ("_END", "_END"),
    ("_TIMEOUT", "_TO"),
    ("_TO", "_TO"),
];

/// Returns the canonical replacement for a reserved name.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    RESERVED_NAMES
        .iter()
        .find(|(reserved, _)| *reserved == name)
        .map(|(_, canonical)| *canonical)
}

pub fn is_reserved(name: &str) -> bool {
    canonical_name(name).is_some()
}

/// Iterates the reserved names (the table keys).
pub fn reserved_names() -> impl Iterator<Item = &'static str> {
    RESERVED_NAMES.iter().map(|(reserved, _)| *reserved)
}

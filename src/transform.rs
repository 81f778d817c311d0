//! Transform Module for hmd
//!
//! Turns one script from its local form into what hackmud accepts:
//!
//! ```text
//! // +autocomplete target:"#s.some.npc"
//! module.exports = function(context, args) { return $db.f({}) };
//! ```
//!
//! becomes
//!
//! ```text
//! // +autocomplete target:"#s.some.npc"
//! function(context, args) {//target:"#s.some.npc"
//!  return #db.f({}) }
//! ```
//!
//! All rewriting is done by splicing byte ranges of the working text rather
//! than printing a modified AST, so formatting outside the edited ranges is
//! preserved exactly. Offsets come from a single parse, so every edit is
//! collected first and then applied from the end of the text backwards.

use oxc_allocator::Allocator;
use oxc_parser::Parser;

use crate::directives::{scan_directives, script_source_type};
use crate::minify::minify;
use crate::renamer::{IdentifierOccurrence, ReservedNameCollector};
use crate::validate::{validate_script, ParseStage, TranspileError};

// ═══════════════════════════════════════════════════════════════════════════════
// TEXT EDITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Replace `start..end` of the working text with `replacement`.
/// `start == end` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: u32,
    pub end: u32,
    pub replacement: String,
}

impl Edit {
    pub fn replace(start: u32, end: u32, replacement: impl Into<String>) -> Self {
        Edit {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    pub fn delete(start: u32, end: u32) -> Self {
        Self::replace(start, end, "")
    }
}

impl From<&IdentifierOccurrence> for Edit {
    fn from(occurrence: &IdentifierOccurrence) -> Self {
        Edit::replace(occurrence.start, occurrence.end, occurrence.replacement)
    }
}

/// Apply non-overlapping `edits` to `text`.
///
/// Edits are applied in descending start order so the offsets of the ones
/// still pending stay valid. An insertion sharing its offset with a
/// replacement lands in front of the replaced text.
pub fn apply_edits(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut result = text.to_string();
    let mut limit = u32::MAX;
    for edit in edits {
        debug_assert!(edit.start <= edit.end, "inverted edit {:?}", edit);
        debug_assert!(edit.end <= limit, "overlapping edit {:?}", edit);
        limit = edit.start;
        result.replace_range((edit.start as usize)..(edit.end as usize), &edit.replacement);
    }
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Transform a script into its deployable form.
pub fn transpile(source: &str) -> Result<String, TranspileError> {
    let directives = scan_directives(source)?;

    let code = if directives.minify {
        minify(source, directives.mangle)?
    } else {
        source.to_string()
    };

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &code, script_source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(TranspileError::parse(ParseStage::Working, &ret.errors));
    }
    let program = ret.program;

    let shape = validate_script(&program, &code)?;

    let occurrences = ReservedNameCollector::collect(&program);
    tracing::debug!("Rewriting {} reserved names", occurrences.len());

    let mut edits: Vec<Edit> = occurrences.iter().map(Edit::from).collect();
    if let Some(hint) = directives.autocomplete_hint() {
        edits.push(Edit::insert(shape.body_start + 1, format!("//{}\n", hint)));
    }
    edits.push(Edit::delete(shape.wrapper.start, shape.wrapper.end));

    let mut output = apply_edits(&code, edits);

    // hackmud rejects a trailing semicolon after the function
    if output.ends_with(';') {
        output.pop();
    }

    Ok(output)
}

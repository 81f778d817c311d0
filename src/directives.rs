//! Directive Scanner for hmd
//!
//! Script authors switch pipeline features on with line comments of the form
//! `// +flag [argument]`. The raw source is parsed once so that only real
//! comments count, never `//` inside strings or regex literals.

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

use crate::validate::{ParseStage, TranspileError};

lazy_static! {
    /// `+word rest`, applied to the comment body after the `//`.
    static ref DIRECTIVE_RE: Regex = Regex::new(r"^\s*\+([A-Za-z0-9_]+)\s*(.*)$").unwrap();
}

/// Pipeline switches collected from a script's directive comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    pub minify: bool,
    pub mangle: bool,
    /// `None` when the directive is absent. `Some("")` is present but empty.
    pub autocomplete: Option<String>,
    /// Unrecognised flag names, in encounter order.
    pub unknown: Vec<String>,
}

impl DirectiveSet {
    /// The autocomplete text to inject, if any.
    pub fn autocomplete_hint(&self) -> Option<&str> {
        self.autocomplete.as_deref().filter(|hint| !hint.is_empty())
    }

    fn apply(&mut self, flag: &str, argument: &str) {
        match flag {
            "minify" => self.minify = true,
            "mangle" => self.mangle = true,
            "autocomplete" => self.autocomplete = Some(argument.trim().to_string()),
            _ => {
                tracing::warn!("Unknown flag: {}", flag);
                self.unknown.push(flag.to_string());
            }
        }
    }
}

pub(crate) fn script_source_type() -> SourceType {
    SourceType::default().with_script(true)
}

/// Scan `source` for directive comments.
pub fn scan_directives(source: &str) -> Result<DirectiveSet, TranspileError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, script_source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(TranspileError::parse(ParseStage::Directives, &ret.errors));
    }

    let mut directives = DirectiveSet::default();
    for comment in ret.program.comments.iter().filter(|c| c.is_line()) {
        let text = comment.span.source_text(source);
        let body = text.strip_prefix("//").unwrap_or(text);
        if let Some((flag, argument)) = parse_directive(body) {
            directives.apply(flag, argument);
        }
    }

    Ok(directives)
}

/// Splits a comment body into its flag and argument.
fn parse_directive(body: &str) -> Option<(&str, &str)> {
    let caps = DIRECTIVE_RE.captures(body)?;
    let flag = caps.get(1)?.as_str();
    let argument = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((flag, argument))
}

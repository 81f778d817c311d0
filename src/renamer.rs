use oxc_ast::ast::{BindingIdentifier, IdentifierReference, Program};
use oxc_ast_visit::Visit;
use oxc_syntax::symbol::SymbolId;

use crate::globals::{canonical_name, is_reserved};

/// A reserved identifier reference and the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierOccurrence {
    pub start: u32,
    pub end: u32,
    pub name: String,
    pub replacement: &'static str,
}

/// Collects every reference to a reserved global.
///
/// Only identifier references are rewritten. Property names (`obj.$db`) and
/// bindings are left alone.
#[derive(Default)]
pub struct ReservedNameCollector {
    pub occurrences: Vec<IdentifierOccurrence>,
}

impl ReservedNameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occurrences of reserved names in `program`, in document order.
    pub fn collect(program: &Program<'_>) -> Vec<IdentifierOccurrence> {
        let mut collector = Self::new();
        collector.visit_program(program);
        collector.occurrences.sort_by_key(|o| o.start);
        collector.occurrences
    }
}

impl<'a> Visit<'a> for ReservedNameCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if let Some(replacement) = canonical_name(ident.name.as_str()) {
            self.occurrences.push(IdentifierOccurrence {
                start: ident.span.start,
                end: ident.span.end,
                name: ident.name.to_string(),
                replacement,
            });
        }
    }
}

/// Collects the symbols of bindings that declare a reserved name, so the
/// mangler's renames can be undone for them.
#[derive(Default)]
pub struct ReservedBindingCollector {
    pub bindings: Vec<(SymbolId, String)>,
}

impl<'a> Visit<'a> for ReservedBindingCollector {
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        if !is_reserved(ident.name.as_str()) {
            return;
        }
        if let Some(symbol_id) = ident.symbol_id.get() {
            self.bindings.push((symbol_id, ident.name.to_string()));
        }
    }
}

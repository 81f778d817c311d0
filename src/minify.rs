//! Minify Module for hmd
//!
//! Runs the `+minify` pass: compress for an ES2015 target, optionally mangle
//! local names, and print the result back out in readable form. hackmud
//! counts characters, but authors still need to read the deployed script
//! in-game, so output is beautified rather than squeezed onto one line.

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions, LegalComment};
use oxc_compat::EngineTargets;
use oxc_mangler::MangleOptions;
use oxc_minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;

use crate::directives::script_source_type;
use crate::renamer::ReservedBindingCollector;
use crate::validate::{ParseStage, TranspileError};

/// hackmud's engine predates optional chaining and `??`.
const TARGET: &str = "es2015";

fn compress_options() -> Result<CompressOptions, TranspileError> {
    let target = EngineTargets::from_target(TARGET).map_err(|e| TranspileError::Target {
        target: TARGET,
        message: e.to_string(),
    })?;
    Ok(CompressOptions {
        target,
        ..CompressOptions::default()
    })
}

fn print_comments() -> CommentOptions {
    CommentOptions {
        normal: false,
        jsdoc: false,
        annotation: false,
        legal: LegalComment::Inline,
        ..CommentOptions::default()
    }
}

/// Minify `source`, mangling local names when `mangle` is set.
///
/// Reserved globals are never renamed: bindings that declare one get their
/// original name back after the mangler has run.
pub fn minify(source: &str, mangle: bool) -> Result<String, TranspileError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, script_source_type()).parse();
    if !ret.errors.is_empty() {
        return Err(TranspileError::parse(ParseStage::Minify, &ret.errors));
    }
    let mut program = ret.program;

    let options = MinifierOptions {
        mangle: mangle.then(MangleOptions::default),
        compress: Some(compress_options()?),
    };
    let minified = Minifier::new(options).minify(&allocator, &mut program);

    let mut scoping = minified.scoping;
    if let Some(scoping) = scoping.as_mut() {
        let mut reserved = ReservedBindingCollector::default();
        reserved.visit_program(&program);
        for (symbol_id, name) in &reserved.bindings {
            tracing::debug!("Keeping reserved binding {}", name);
            scoping.set_symbol_name(*symbol_id, name);
        }
    }

    let code = Codegen::new()
        .with_options(CodegenOptions {
            comments: print_comments(),
            ..CodegenOptions::default()
        })
        .with_scoping(scoping)
        .with_private_member_mappings(minified.class_private_mappings)
        .build(&program)
        .code;

    // the printer ends with a newline; the semicolon before it must be last
    Ok(code.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_es2015_target_resolves() {
        assert!(compress_options().is_ok());
    }

    #[test]
    fn test_parse_failure_reports_minify_stage() {
        let err = minify("var = ;", false).unwrap_err();
        assert!(matches!(
            err,
            TranspileError::Parse {
                stage: ParseStage::Minify,
                ..
            }
        ));
        assert!(err.to_string().starts_with("failed to parse script for minification"));
    }

    #[test]
    fn test_output_has_no_es2020_syntax() {
        let out = minify(
            "var f = function(args) { var o = args.o; var v = o == null ? void 0 : o.v; return v == null ? 5 : v }",
            false,
        )
        .unwrap();
        assert!(!out.contains("?."), "{}", out);
        assert!(!out.contains("??"), "{}", out);
    }
}
